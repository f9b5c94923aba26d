use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod debug;
mod schedule;
mod scrape;

#[derive(Debug, Parser)]
#[command(name = "repricer-cli")]
#[command(about = "Competitor scrape and ranking command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Scrape every product assigned to one cron, then exit
    Scrape {
        /// Cron id or name from the vendors file
        #[arg(long)]
        cron: String,
    },
    /// Run every enabled cron on its schedule until interrupted
    Schedule,
    /// Rank a saved catalog payload and print the competitive set as JSON
    Rank {
        /// File holding a vendor-options response body
        #[arg(long)]
        payload: PathBuf,
        /// Vendor id to locate in the ranking
        #[arg(long)]
        vendor: String,
        #[arg(long, default_value_t = 1)]
        tier: u32,
        /// Rank on unit price plus shipping
        #[arg(long)]
        include_shipping: bool,
    },
    /// Classify a reprice outcome JSON file and print its result code
    Classify {
        #[arg(long)]
        outcome: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Rank {
            payload,
            vendor,
            tier,
            include_shipping,
        }) => debug::run_rank(&payload, &vendor, tier, include_shipping)?,
        Some(Commands::Classify { outcome }) => debug::run_classify(&outcome)?,
        Some(Commands::Migrate) => {
            let config = repricer_core::load_app_config()?;
            let pool = connect(&config).await?;
            let applied = repricer_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Some(Commands::Scrape { cron }) => {
            let config = repricer_core::load_app_config()?;
            let pool = connect(&config).await?;
            scrape::run_scrape(pool, &config, &cron).await?;
        }
        Some(Commands::Schedule) => {
            let config = repricer_core::load_app_config()?;
            let pool = connect(&config).await?;
            schedule::run_schedule(pool, config).await?;
        }
        None => println!("repricer-cli: no command given; see --help"),
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `REPRICER_LOG_LEVEL`, then `info`.
fn init_tracing() -> anyhow::Result<()> {
    let fallback = std::env::var("REPRICER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

async fn connect(config: &repricer_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = repricer_db::connect_pool(
        &config.database_url,
        repricer_db::PoolConfig::from_app_config(config),
    )
    .await?;
    Ok(pool)
}
