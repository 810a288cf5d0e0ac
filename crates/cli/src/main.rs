use anyhow::Result;
use clap::Parser;
use tracing::info;

use deployment_report::{app, args::Cli, config::Config, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration, then let flags override it
    let mut config = Config::load()?;
    config.apply_cli(&cli);

    logging::init_logging(&config.logging);

    info!("Starting deployment-report v{}", env!("CARGO_PKG_VERSION"));

    match app::run(&config).await {
        Ok(summary) => {
            print!("{}", summary);
            Ok(())
        }
        Err(e) => {
            e.log();
            Err(e.into())
        }
    }
}
