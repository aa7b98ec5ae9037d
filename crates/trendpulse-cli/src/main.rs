mod buckets;
mod collect;
mod probe;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use buckets::BucketCommands;
use probe::ProbeCommands;

#[derive(Debug, Parser)]
#[command(name = "trendpulse-cli")]
#[command(about = "trendpulse command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Collect trending content into today's buckets
    Collect {
        /// Country to collect (repeatable); defaults to TRENDPULSE_COUNTRIES
        #[arg(long = "country", short = 'c')]
        countries: Vec<String>,
    },
    /// Call a single source and print what it returns, without storing anything
    Probe {
        #[command(subcommand)]
        command: ProbeCommands,
    },
    /// Inspect stored keyword buckets
    Buckets {
        #[command(subcommand)]
        command: BucketCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check the database connection
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("trendpulse-cli: no command given; try --help");
        return Ok(());
    };

    let config = trendpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Probing talks to the network only.
    if let Commands::Probe { command } = command {
        return probe::run_probe(&config, command).await;
    }

    let pool = trendpulse_db::connect_pool(
        &config.database_url,
        trendpulse_db::PoolConfig::from_app_config(&config),
    )
    .await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => {
                trendpulse_db::health_check(&pool).await?;
                println!("database ok");
            }
            DbCommands::Migrate => {
                let applied = trendpulse_db::run_migrations(&pool).await?;
                println!("applied {applied} migration(s)");
            }
        },
        Commands::Collect { countries } => {
            collect::run_collect(&pool, &config, &countries).await?;
        }
        Commands::Buckets { command } => buckets::run_buckets(&pool, command).await?,
        Commands::Probe { .. } => unreachable!("probe handled above"),
    }

    pool.close().await;
    Ok(())
}
