use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{json, Value};

use lp_transfer_classifier::context::CachedPositionDirectory;
use lp_transfer_classifier::{
    ClassificationContext, ClassificationPipeline, ClassifierConfig, InMemoryChainData,
    TransactionTransfers,
};

#[derive(Parser)]
#[command(author, version, about = "Classify LP transfer logs", long_about = None)]
struct Cli {
    /// Path to a JSON classifier configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single transaction fixture
    Tx {
        /// JSON file with `transaction` and `chainData`
        #[arg(long)]
        file: PathBuf,
    },
    /// Classify every transaction in a batch fixture
    Batch {
        /// JSON file with `transactions` and `chainData`
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxFixture {
    transaction: TransactionTransfers,
    #[serde(default)]
    chain_data: InMemoryChainData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchFixture {
    transactions: Vec<TransactionTransfers>,
    #[serde(default)]
    chain_data: InMemoryChainData,
}

fn read_fixture<T: for<'de> Deserialize<'de>>(file: &PathBuf) -> Result<T> {
    let data = fs::read(file).with_context(|| format!("failed to read {:?}", file))?;
    serde_json::from_slice(&data).with_context(|| format!("failed to parse JSON in {:?}", file))
}

fn build_pipeline(
    chain_data: InMemoryChainData,
    config: &ClassifierConfig,
) -> Result<ClassificationPipeline> {
    let chain_data = Arc::new(chain_data);
    let context = ClassificationContext::from_provider(chain_data.clone())
        .with_positions(Arc::new(CachedPositionDirectory::new(chain_data)));
    Ok(ClassificationPipeline::new(context, config)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = match &cli.config {
        Some(path) => ClassifierConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => ClassifierConfig::default(),
    };

    let output = match cli.command {
        Commands::Tx { file } => {
            let fixture: TxFixture = read_fixture(&file)?;
            let pipeline = build_pipeline(fixture.chain_data, &config)?;
            let classification = pipeline.classify(&fixture.transaction).await?;
            serde_json::to_value(classification)?
        }
        Commands::Batch { file } => {
            let fixture: BatchFixture = read_fixture(&file)?;
            let pipeline = build_pipeline(fixture.chain_data, &config)?;
            let results = pipeline.classify_batch(&fixture.transactions).await;
            let entries = results
                .into_iter()
                .map(|entry| match entry.result {
                    Ok(classification) => json!({
                        "txHash": entry.tx_hash,
                        "classification": classification,
                    }),
                    Err(err) => json!({
                        "txHash": entry.tx_hash,
                        "error": err.to_string(),
                    }),
                })
                .collect();
            Value::Array(entries)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
