//! Country → news-feed locale mapping.

/// Locale parameters for a Google News edition (`hl`, `gl`, `ceid`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsLocale {
    pub hl: String,
    pub gl: String,
    pub ceid: String,
}

/// Resolve the news edition for a normalized country code.
///
/// Unknown countries fall back to the English edition of that country.
#[must_use]
pub fn news_locale(country: &str) -> NewsLocale {
    let (hl, lang) = match country {
        "KR" => ("ko", "ko"),
        "JP" => ("ja", "ja"),
        "US" => ("en-US", "en"),
        "GB" => ("en-GB", "en"),
        "DE" => ("de", "de"),
        "FR" => ("fr", "fr"),
        "TW" => ("zh-TW", "zh-Hant"),
        "CN" => ("zh-CN", "zh-Hans"),
        _ => ("en", "en"),
    };

    NewsLocale {
        hl: hl.to_string(),
        gl: country.to_string(),
        ceid: format!("{country}:{lang}"),
    }
}
