//! Daily keyword bucket identity and scoring.

use chrono::NaiveDate;

/// Weight of one stored video in a bucket's composite score.
pub const VIDEO_WEIGHT: f64 = 1.5;
/// Weight of one stored news item in a bucket's composite score.
pub const NEWS_WEIGHT: f64 = 1.0;

/// Trim and upper-case a country code (`" kr "` → `"KR"`).
#[must_use]
pub fn normalize_country(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Synthetic natural key of the bucket for `country` on `date`,
/// e.g. `Trending_KR_20261019`.
#[must_use]
pub fn day_label(country: &str, date: NaiveDate) -> String {
    format!("Trending_{}_{}", country, date.format("%Y%m%d"))
}

/// `video_count * 1.5 + news_count * 1.0`.
#[must_use]
pub fn composite_score(video_count: i64, news_count: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let (videos, news) = (video_count as f64, news_count as f64);
    videos * VIDEO_WEIGHT + news * NEWS_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_label_pads_month_and_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).expect("valid date");
        assert_eq!(day_label("KR", date), "Trending_KR_20260307");
    }

    #[test]
    fn day_label_differs_per_country_and_day() {
        let d1 = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let d2 = NaiveDate::from_ymd_opt(2026, 10, 20).expect("valid date");
        assert_ne!(day_label("KR", d1), day_label("US", d1));
        assert_ne!(day_label("KR", d1), day_label("KR", d2));
    }

    #[test]
    fn composite_score_weights_videos_higher() {
        assert!((composite_score(5, 3) - 10.5).abs() < f64::EPSILON);
        assert!((composite_score(2, 0) - 3.0).abs() < f64::EPSILON);
        assert!(composite_score(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn normalize_country_trims_and_uppercases() {
        assert_eq!(normalize_country(" kr "), "KR");
        assert_eq!(normalize_country(""), "");
    }
}
