use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payflow::application::engine::LifecycleEngine;
use payflow::domain::payment::MerchantId;
use payflow::domain::ports::PaymentStoreBox;
use payflow::infrastructure::in_memory::InMemoryPaymentStore;
use payflow::infrastructure::processor::SimulatedProcessor;
use payflow::interfaces::csv::action_reader::ActionReader;
use payflow::interfaces::csv::payment_writer::PaymentWriter;
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input lifecycle actions CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Simulated card processor latency in milliseconds.
    #[arg(long, default_value_t = 0)]
    processing_delay_ms: u64,

    /// Only output payments taken on behalf of this merchant.
    #[arg(long)]
    merchant: Option<String>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let store = open_store(cli.db_path)?;
    let processor = SimulatedProcessor::with_latency(Duration::from_millis(cli.processing_delay_ms));
    let engine = LifecycleEngine::new(store, Box::new(processor));

    // Rejected or malformed rows are reported and skipped.
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = ActionReader::new(file);
    for (index, action) in reader.actions().enumerate() {
        let row = index + 1;
        match action {
            Ok(action) => {
                if let Err(e) = action.apply(&engine).await {
                    warn!(row, kind = ?e.kind(), error = %e, "Error applying action");
                }
            }
            Err(e) => {
                warn!(row, error = %e, "Error reading action");
            }
        }
    }

    let payments = match cli.merchant {
        Some(merchant) => engine.payments_for_merchant(&MerchantId::new(merchant)).await,
        None => engine.into_results().await,
    }
    .into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = PaymentWriter::new(stdout.lock());
    writer.write_payments(&payments).into_diagnostic()?;

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = payflow::infrastructure::rocksdb::RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryPaymentStore::new()))
        }
        None => Ok(Box::new(InMemoryPaymentStore::new())),
    }
}
