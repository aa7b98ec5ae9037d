//! `probe` command: exercise one source adapter and print its output.

use clap::Subcommand;
use trendpulse_core::AppConfig;
use trendpulse_sources::{
    issue_board_for, video_search_for, GoogleNewsClient, HttpSettings, IssueBoardSource,
    NewsFeedSource, TrendingVideoSource, VideoSearchSource, YouTubeApiClient,
};

#[derive(Debug, Subcommand)]
pub enum ProbeCommands {
    /// Trending videos for a country (needs YOUTUBE_API_KEY)
    Trending {
        #[arg(long, default_value = "KR")]
        country: String,
        #[arg(long, default_value_t = 10)]
        max: u32,
    },
    /// Video search for a query
    Search {
        query: String,
        #[arg(long, default_value_t = 10)]
        max: u32,
    },
    /// News feed for a country
    News {
        #[arg(long, default_value = "KR")]
        country: String,
    },
    /// The configured issue board
    Issues,
}

/// # Errors
///
/// Returns an error if the adapter cannot be built or the call fails.
pub(crate) async fn run_probe(config: &AppConfig, command: ProbeCommands) -> anyhow::Result<()> {
    let http = HttpSettings::from_app_config(config);
    let api_key = config.youtube_api_key.as_deref();

    match command {
        ProbeCommands::Trending { country, max } => {
            let client = YouTubeApiClient::new(&http, api_key)?;
            let videos = client
                .fetch_trending(&trendpulse_core::normalize_country(&country), max)
                .await?;
            for v in &videos {
                println!(
                    "{:<14}{:>12}  {}",
                    v.video_id,
                    v.views.map_or_else(|| "-".to_string(), |n| n.to_string()),
                    v.title
                );
            }
        }
        ProbeCommands::Search { query, max } => {
            let search = video_search_for(api_key, &http)?;
            println!("source: {}", search.name());
            for v in search.search(&query, max).await? {
                println!("{:<14}{}", v.video_id, v.title);
            }
        }
        ProbeCommands::News { country } => {
            let client = GoogleNewsClient::new(&http)?;
            for item in client
                .fetch(&trendpulse_core::normalize_country(&country))
                .await?
            {
                println!("{}\n    {}", item.title, item.url);
            }
        }
        ProbeCommands::Issues => {
            let board = issue_board_for(config.issue_board, &http)?;
            println!("source: {}", board.name());
            for k in board.fetch().await? {
                println!("{:>3}  {}", k.rank, k.keyword);
            }
        }
    }

    Ok(())
}
