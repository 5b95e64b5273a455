//! Equipment receipts CLI
//!
//! # Usage
//!
//! ```bash
//! # List grouped items currently available for issue
//! receipts available --search helmet
//!
//! # Issue a receipt from a plan file with a captured signature
//! receipts issue plan.json --signature signature.png
//!
//! # Change the items of an existing receipt
//! receipts update 64f1c2 plan.json
//!
//! # Return a receipt
//! receipts return 64f1c2
//!
//! # Print the composed selection as CSV without submitting
//! receipts export plan.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use equipment_receipts_client::{ClientError, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "receipts")]
#[command(author, version, about = "Equipment receipt tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List grouped items available for issue
    Available {
        /// Filter by item name, location or id number
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Compose and issue a new receipt
    Issue {
        /// Plan file (JSON)
        plan: PathBuf,

        /// Signature image (PNG)
        #[arg(short, long)]
        signature: Option<PathBuf>,
    },
    /// Change the items of an existing receipt
    Update {
        receipt_id: String,

        /// Plan file (JSON)
        plan: PathBuf,
    },
    /// Return every item of a receipt
    Return { receipt_id: String },
    /// Print the composed selection as CSV without submitting
    Export {
        /// Plan file (JSON)
        plan: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    dotenvy::dotenv().ok();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<ClientError>() {
            Some(client_error) => {
                let detail = client_error.detail();
                tracing::error!(
                    code = %detail.code,
                    message_he = %detail.message_he,
                    "{}",
                    detail.message_en
                );
            }
            None => tracing::error!("Command failed: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "equipment_receipts_client=debug,receipts=info,reqwest=warn".into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load().map_err(|e| ClientError::Configuration(e.to_string()))?;
    tracing::debug!("Environment: {}", config.environment);

    match cli.command {
        Commands::Available { search } => commands::inventory::available(&config, search.as_deref()).await?,
        Commands::Issue { plan, signature } => {
            commands::receipt::issue(&config, &plan, signature.as_deref()).await?
        }
        Commands::Update { receipt_id, plan } => commands::receipt::update(&config, &receipt_id, &plan).await?,
        Commands::Return { receipt_id } => commands::receipt::return_all(&config, &receipt_id).await?,
        Commands::Export { plan } => commands::receipt::export(&config, &plan).await?,
    }
    Ok(())
}
