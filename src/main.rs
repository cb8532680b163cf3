// src/main.rs
//! Entry point: load configuration, connect the chain client and keep
//! the ledger caught up with the chain tip.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::time::sleep;
use tracing::{info, warn};

use config::Config;
use indexer::BlockApplier;
use node::{ChainClient, RpcChainClient};

#[derive(Debug, Parser)]
#[command(name = "rosescriptions-indexer", version, about = "RRC-20 inscription indexer")]
struct Cli {
    /// Path to the TOML configuration file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the chain RPC endpoint
    #[arg(long)]
    rpc_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(rpc_url) = cli.rpc_url {
        config.chain.rpc_url = rpc_url;
    }

    let level: tracing::Level = config.logging.level.parse().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!(rpc_url = %config.chain.rpc_url, start_height = config.indexer.start_height, "starting indexer");

    let client = RpcChainClient::new(&config.chain.rpc_url);
    let mut applier = BlockApplier::new(config.indexer.start_height);
    let poll_interval = Duration::from_secs(config.chain.poll_interval_secs);

    loop {
        let tip = match client.latest_height().await {
            Ok(tip) => tip,
            Err(err) => {
                warn!(%err, "failed to read chain tip");
                sleep(poll_interval).await;
                continue;
            }
        };
        let applied = catch_up(&client, &mut applier, tip).await?;
        if applied == 0 {
            sleep(poll_interval).await;
        }
    }
}

/// Apply every block between the current height and `tip`, in order.
/// Stops early on fetch errors so the next round retries the same
/// block; returns how many blocks were applied.
async fn catch_up<C: ChainClient>(
    client: &C,
    applier: &mut BlockApplier,
    tip: u64,
) -> Result<u64> {
    let mut applied = 0;
    while applier.ledger().height() < tip {
        let number = applier.ledger().height() + 1;
        let block = match client.fetch_block(number).await {
            Ok(block) => block,
            Err(err) => {
                warn!(number, %err, "failed to fetch block");
                break;
            }
        };
        applier.apply_block(&block)?;
        applied += 1;
    }
    if applied > 0 {
        info!(
            height = applier.ledger().height(),
            applied, "ledger caught up"
        );
    }
    Ok(applied)
}
