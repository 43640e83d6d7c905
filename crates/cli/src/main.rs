//! Sugar Snap CLI - browse the food catalog and place purchases.
//!
//! # Usage
//!
//! ```bash
//! # List one catalog page
//! ss-cli list --page 0
//!
//! # Walk the whole catalog
//! ss-cli list
//!
//! # Buy two borscht and one pelmeni
//! ss-cli buy borscht-42=2 pelmeni-1=1
//! ```
//!
//! Configuration comes from the environment (see `sugar-snap-client`);
//! `FOOD_SERVICE_URL` is required. Log verbosity follows `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sugar_snap_client::FoodServiceConfig;

mod commands;

#[derive(Parser)]
#[command(name = "ss-cli")]
#[command(author, version, about = "Sugar Snap CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog items
    List {
        /// Fetch a single page instead of walking the whole catalog
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Buy items by catalog id
    Buy {
        /// Items to buy, as ID=COUNT pairs
        #[arg(required = true, value_name = "ID=COUNT")]
        items: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = FoodServiceConfig::from_env()?;
    match cli.command {
        Commands::List { page } => commands::list::run(&config, page).await?,
        Commands::Buy { items } => commands::buy::run(&config, &items).await?,
    }
    Ok(())
}
