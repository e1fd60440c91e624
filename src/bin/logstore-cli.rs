//! Command-line client talking to the LogStore contract directly.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use logstore_gateway::config::load_config;
use logstore_gateway::lifecycle::bootstrap;
use logstore_gateway::logs::{LogRecordInput, LogRecordOutput};
use logstore_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "logstore-cli")]
#[command(about = "Submit and read LogStore audit records", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "LOGSTORE_CONFIG")]
    config: Option<PathBuf>,

    /// Print JSON instead of text lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a log record and wait for its receipt
    Send {
        doctor: String,
        reason: String,
        patient_id: String,
        /// Unix seconds
        log_time: u64,
        message: String,
        /// Give up waiting for the receipt after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Show one record
    Get { index: u64 },
    /// Show every record in index order
    List,
    /// Show the number of records
    Count,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.observability.log_level = "warn".to_string();
    logging::init_tracing(&config.observability);

    let components = bootstrap(&config)?;

    match cli.command {
        Commands::Send {
            doctor,
            reason,
            patient_id,
            log_time,
            message,
            timeout,
        } => {
            let record = LogRecordInput {
                doctor_name: doctor,
                reason,
                patient_id,
                log_time,
                message,
            };
            let wait = timeout
                .map(Duration::from_secs)
                .or(config.chain.confirmation_timeout_secs.map(Duration::from_secs));
            let receipt = components.submitter.submit_with_timeout(record, wait).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            } else {
                println!(
                    "tx_hash={} block_number={} gas_used={} status={}",
                    receipt.tx_hash,
                    receipt.block_number,
                    receipt.gas_used,
                    if receipt.is_success() { "success" } else { "failed" }
                );
            }
        }
        Commands::Get { index } => {
            let record = components.query.get_one(index).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", format_record(index, &record));
            }
        }
        Commands::List => {
            let records = components.query.get_all().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("Log count: {}", records.len());
                for (index, record) in records.iter().enumerate() {
                    println!("{}", format_record(index as u64, record));
                }
            }
        }
        Commands::Count => {
            println!("{}", components.query.count().await?);
        }
    }

    Ok(())
}

fn format_record(index: u64, record: &LogRecordOutput) -> String {
    format!(
        "[{}] sender={} blockTimestamp={} doctorName={:?} reason={:?} patientId={:?} logTime={} message={:?}",
        index,
        record.sender,
        record.block_timestamp,
        record.doctor_name,
        record.reason,
        record.patient_id,
        record.log_time,
        record.message,
    )
}
