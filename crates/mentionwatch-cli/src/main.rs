mod monitor;
mod query;

use clap::{Parser, Subcommand};
use mentionwatch_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mentionwatch-cli")]
#[command(about = "mentionwatch operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one monitoring cycle over the tracked brands
    Run {
        /// Restrict the cycle to one tracked brand (case-insensitive)
        #[arg(long)]
        brand: Option<String>,

        /// Fetch and analyze without touching the database; events go to the log
        #[arg(long)]
        dry_run: bool,
    },
    /// Print sentiment, topic and keywords for a piece of text
    Analyze {
        /// Text to analyze
        text: String,
    },
    /// Show hour-over-hour mention volume and the spike verdict for a brand
    Spike {
        #[arg(long)]
        brand: String,
    },
    /// List recent alerts
    Alerts {
        /// Filter to one brand (case-insensitive)
        #[arg(long)]
        brand: Option<String>,

        /// Maximum number of alerts to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },
    /// Show recent monitor runs
    Runs {
        /// Maximum number of runs to show
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mentionwatch_core::load_app_config();

    let fallback_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("mentionwatch-cli: run with --help to list commands");
        return Ok(());
    };

    let app_config = || {
        config
            .as_ref()
            .map_err(|e| anyhow::anyhow!("configuration error: {e}"))
    };

    match command {
        Commands::Run { brand, dry_run } => {
            monitor::run_cycle(app_config()?, brand.as_deref(), dry_run).await
        }
        Commands::Analyze { text } => {
            // Pure; borrows thresholds from config only when it loads.
            let thresholds = config
                .as_ref()
                .map(|c| c.sentiment_thresholds)
                .unwrap_or_default();
            query::run_analyze(&text, thresholds)
        }
        Commands::Spike { brand } => {
            let config = app_config()?;
            let pool = connect(config).await?;
            monitor::run_spike(&pool, config, &brand).await
        }
        Commands::Alerts { brand, limit } => {
            let pool = connect(app_config()?).await?;
            query::run_alerts(&pool, brand.as_deref(), i64::from(limit)).await
        }
        Commands::Runs { limit } => {
            let pool = connect(app_config()?).await?;
            query::run_monitor_runs(&pool, i64::from(limit)).await
        }
        Commands::Migrate => {
            let pool = connect(app_config()?).await?;
            let applied = mentionwatch_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
    }
}

/// Connect to Postgres with the configured pool settings.
async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool = mentionwatch_db::connect_pool(
        &config.database_url,
        mentionwatch_db::PoolConfig::from_app_config(config),
    )
    .await?;
    Ok(pool)
}

#[cfg(test)]
mod tests;
