//! `buckets` command: read-only views of keyword buckets and their content.

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum BucketCommands {
    /// List recent buckets
    List {
        /// Restrict to one country
        #[arg(long)]
        country: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Show one bucket with its top videos and news
    Show {
        id: i64,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

/// # Errors
///
/// Returns an error if a query fails or the bucket does not exist.
pub(crate) async fn run_buckets(pool: &sqlx::PgPool, command: BucketCommands) -> anyhow::Result<()> {
    match command {
        BucketCommands::List { country, limit } => {
            let country = country.map(|c| trendpulse_core::normalize_country(&c));
            let buckets = trendpulse_db::list_buckets(pool, country.as_deref(), limit).await?;
            if buckets.is_empty() {
                println!("no buckets found; run `collect` first");
                return Ok(());
            }

            println!(
                "{:<8}{:<26}{:<8}{:<8}{:<8}SCORE",
                "ID", "KEYWORD", "COUNTRY", "VIDEOS", "NEWS"
            );
            for b in &buckets {
                println!(
                    "{:<8}{:<26}{:<8}{:<8}{:<8}{:.1}",
                    b.id, b.keyword, b.country, b.video_count, b.news_count, b.composite_score
                );
            }
        }
        BucketCommands::Show { id, limit } => {
            let bucket = match trendpulse_db::get_bucket(pool, id).await {
                Ok(b) => b,
                Err(trendpulse_db::DbError::NotFound) => anyhow::bail!("bucket {id} not found"),
                Err(e) => return Err(e.into()),
            };
            println!("{}", serde_json::to_string_pretty(&bucket)?);

            let videos = trendpulse_db::list_videos_by_bucket(pool, id, limit).await?;
            println!("\nvideos ({}):", videos.len());
            for v in &videos {
                println!("  {:>12}  {}", v.views, v.title.as_deref().unwrap_or(""));
            }

            let news = trendpulse_db::list_news_by_bucket(pool, id, limit).await?;
            println!("\nnews ({}):", news.len());
            for n in &news {
                println!("  {}", n.title.as_deref().unwrap_or(""));
            }
        }
    }

    Ok(())
}
