mod products;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "crystal-cli")]
#[command(about = "Crystal catalogue command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Rewrite stored list columns (sizes, images, key features) in canonical form
    Repair {
        /// Report rows that would change without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print every product with its brand and featured flag
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("crystal-cli: use --help to list commands");
        return Ok(());
    };

    let config = crystal_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = crystal_db::PoolConfig::from_app_config(&config);
    let pool = crystal_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = crystal_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Repair { dry_run } => products::run_repair(&pool, dry_run).await?,
        Commands::List => products::run_list(&pool).await?,
    }

    pool.close().await;
    Ok(())
}
