use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use zcn_client::cancel::Cancellation;
use zcn_client::client::*;
use zcn_client::config::ClientConfig;
use zcn_client::network::ClientNetwork;
use zcn_common::{Wallet, ZcnError};

// Command line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: String,

    /// Hex encoded 32 byte wallet seed; a fresh wallet is generated if absent
    #[arg(short, long)]
    seed: Option<String>,

    /// Overall deadline for the operation, in seconds
    #[arg(short, long)]
    deadline: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transfer tokens and wait for confirmation
    Send {
        to: String,
        value: i64,
        #[arg(default_value = "")]
        description: String,
    },
    /// Poll sharders for an existing transaction hash
    Verify { hash: String },
}

fn load_wallet(config: &ClientConfig, seed: Option<&str>) -> Result<Wallet, ZcnError> {
    match seed {
        Some(seed) => {
            let bytes: [u8; 32] = hex::decode(seed)
                .map_err(|e| ZcnError::ConfigError(format!("seed is not hex: {e}")))?
                .try_into()
                .map_err(|_| ZcnError::ConfigError("seed must be 32 bytes".to_string()))?;
            Wallet::from_seed(config.signature_scheme, &bytes)
        }
        None => Wallet::random(config.signature_scheme),
    }
}

#[tokio::main]
async fn main() -> Result<(), ZcnError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Arc::new(ClientConfig::from_file(&args.config)?);
    let wallet = load_wallet(&config, args.seed.as_deref())?;
    info!("Using wallet {}", wallet.client_id);

    let network = Arc::new(ClientNetwork::new(config.node_timeout())?);
    let client = Client::new(config, wallet, network)?;

    let cancel = match args.deadline {
        Some(secs) => Cancellation::never().with_timeout(std::time::Duration::from_secs(secs)),
        None => Cancellation::never(),
    };
    let mut txn = client.transaction_with_cancel(cancel)?;
    let result = match args.command {
        Command::Send {
            to,
            value,
            description,
        } => txn.send(&to, value, &description).await,
        Command::Verify { hash } => {
            txn.set_transaction_hash(&hash)?;
            txn.verify().await
        }
    };

    let completion = txn.completion();
    match &result {
        Ok(()) => info!(
            "Transaction {} confirmed: {:?}",
            completion.hash,
            completion.verify_output.map(|c| c.block_hash)
        ),
        Err(e) => error!("Transaction {} failed: {}", completion.hash, e),
    }
    if let Ok(metrics) = gather_metrics() {
        info!("Metrics:\n{}", metrics);
    }
    result
}
