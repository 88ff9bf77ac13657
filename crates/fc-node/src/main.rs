//! fc-node: register and verify files on a proof-of-work sealed chain.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fc_ledger::{ChainValidity, LedgerApi};
use fc_node::{display_name, DuplicatePolicy, FileChainNode, FileOutcome, NodeConfig};
use fc_telemetry::{init_telemetry, TelemetryConfig};

/// fc-node: File-Chain registry node
#[derive(Parser, Debug)]
#[command(name = "fc-node")]
#[command(about = "Register files on a hash-chained, proof-of-work sealed ledger")]
struct Args {
    /// Leading zero hex characters required per block hash
    #[arg(short, long)]
    difficulty: Option<u32>,

    /// Directory holding registered file bytes (default: memory only)
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Chain snapshot to load at start and save after changes
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash, store and seal one block per file
    Register {
        /// Files to register
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Register content that is already on the chain
        #[arg(long)]
        allow_duplicates: bool,
    },

    /// Report where each file's content is registered
    Verify {
        /// Files to look up
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List registered files, oldest first
    History,

    /// Write the file registered in a block back to disk
    Download {
        /// Block index
        index: u64,

        /// Destination (default: the recorded file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print every block as JSON
    Chain,

    /// Walk the chain and report the first violation
    Validate,
}

fn load_config(args: &Args) -> NodeConfig {
    let mut config = NodeConfig::from_env();
    if let Some(difficulty) = args.difficulty {
        config = config.with_difficulty(difficulty);
    }
    if let Some(dir) = &args.store_dir {
        config = config.with_store_dir(dir);
    }
    if let Some(path) = &args.snapshot {
        config = config.with_snapshot_path(path);
    }
    config
}

async fn register(node: &FileChainNode, files: &[PathBuf], allow_duplicates: bool) -> Result<()> {
    let policy = if allow_duplicates {
        DuplicatePolicy::Allow
    } else {
        DuplicatePolicy::Reject
    };

    let report = node.register_paths(files, policy).await?;
    for (path, outcome) in &report.outcomes {
        match outcome {
            FileOutcome::Registered(registration) => {
                let block = &registration.block;
                println!(
                    "#{} {} {} nonce={} hash={}",
                    block.index, block.file_name, block.file_hash, block.nonce, block.hash
                );
            }
            FileOutcome::Skipped {
                file_hash,
                existing,
            } => {
                let name = display_name(path);
                warn!(file = %name, existing, "Skipping duplicate");
                println!("skipped {name}: {file_hash} already registered in block #{existing}");
            }
        }
    }
    if report.persisted {
        info!(registered = report.registered(), "Snapshot updated");
    }

    match report.failure {
        Some((path, e)) => {
            Err(e).with_context(|| format!("Failed to register {}", path.display()))
        }
        None => Ok(()),
    }
}

async fn history(node: &FileChainNode) -> Result<()> {
    let entries = node.registry().history().await?;
    if entries.is_empty() {
        println!("no files registered");
    }
    for entry in entries {
        let block = &entry.block;
        let timestamp = i64::try_from(block.timestamp)
            .ok()
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| block.timestamp.to_string());
        println!(
            "#{} {} {} {}{}",
            block.index,
            timestamp,
            block.file_name,
            block.file_hash,
            if entry.available { "" } else { " (bytes missing)" }
        );
    }
    Ok(())
}

async fn verify(node: &FileChainNode, files: &[PathBuf]) -> Result<()> {
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let verification = node.registry().verify(&bytes).await?;

        match verification.first() {
            Some(first) => {
                let indices: Vec<String> = verification
                    .matches
                    .iter()
                    .map(|b| format!("#{}", b.index))
                    .collect();
                println!(
                    "{}: registered as {:?} at {} in block(s) {}",
                    display_name(path),
                    first.file_name,
                    first.timestamp,
                    indices.join(", ")
                );
            }
            None => println!(
                "{}: not registered ({})",
                display_name(path),
                verification.file_hash
            ),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _telemetry = init_telemetry(TelemetryConfig::for_service("fc-node"))
        .context("Failed to initialize logging")?;

    let config = load_config(&args);
    let node = FileChainNode::open(config)
        .await
        .context("Failed to open ledger")?;

    match &args.command {
        Command::Register {
            files,
            allow_duplicates,
        } => register(&node, files, *allow_duplicates).await?,
        Command::Verify { files } => verify(&node, files).await?,
        Command::History => history(&node).await?,
        Command::Download { index, output } => {
            let (block, path) = node
                .download_to(*index, output.as_deref())
                .await
                .with_context(|| format!("Failed to download block #{index}"))?;
            println!("#{} {} -> {}", block.index, block.file_name, path.display());
        }
        Command::Chain => {
            let blocks = node.ledger().blocks().await?;
            println!("{}", serde_json::to_string_pretty(&blocks)?);
        }
        Command::Validate => {
            let validity = node.ledger().validate().await?;
            println!("{validity}");
            if let ChainValidity::Invalid { .. } = validity {
                bail!("chain failed validation");
            }
        }
    }

    Ok(())
}
