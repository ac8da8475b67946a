use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use price_tracker::commands::{Command, Tracker};
use price_tracker::config::Config;

#[derive(Parser)]
#[command(name = "price-tracker", about = "Board game price tracker", version)]
struct Cli {
    #[command(subcommand)]
    action: Action,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Action {
    #[command(flatten)]
    Tracker(Command),

    /// Refresh prices every `check_interval_seconds` until stopped
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = match cli.verbose {
        0 => "price_tracker=info",
        1 => "price_tracker=debug",
        _ => "trace",
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .init();

    let config = Config::load()?;
    let mut tracker = Tracker::open(config).await?;

    match cli.action {
        Action::Tracker(command) => {
            println!("{}", tracker.run(command).await);
        }
        Action::Watch => watch(&mut tracker).await,
    }

    Ok(())
}

async fn watch(tracker: &mut Tracker) {
    let seconds = tracker.config().check_interval_seconds.max(1);
    let mut interval = interval(Duration::from_secs(seconds));

    loop {
        interval.tick().await;

        info!("--- Starting new check cycle at {} ---", Local::now().format("%Y-%m-%d %H:%M:%S"));
        let reply = tracker.run(Command::Update).await;
        println!("{}", reply);

        info!("Check cycle completed, waiting {} seconds", seconds);
    }
}
