use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ml_alert_gateway::config::{Config, GatewaySettings};
use ml_alert_gateway::watch::{AlertDefinition, BulkUpdateInput, WatchSummary};
use ml_alert_gateway::{AlertGateway, BatchOutcome};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "ml-alert")]
#[command(about = "Manage anomaly-detection alert watches through the console proxy", long_about = None)]
struct Args {
    /// Verbose output (-v, -vv, -vvv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: ~/.ml-alert/config.toml)
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List alert watches
    List {
        /// Print the raw search response
        #[arg(long)]
        json: bool,
    },
    /// Show one alert watch
    Get { alert_id: String },
    /// Delete alert watches
    Delete {
        #[arg(required = true)]
        alert_ids: Vec<String>,
    },
    /// Activate alert watches
    Activate {
        #[arg(required = true)]
        alert_ids: Vec<String>,
    },
    /// Deactivate alert watches
    Deactivate {
        #[arg(required = true)]
        alert_ids: Vec<String>,
    },
    /// Edit notification channels or dashboard links of several watches
    BulkUpdate {
        /// JSON file with the edit flags and values
        #[arg(long)]
        input: PathBuf,
        #[arg(required = true)]
        alert_ids: Vec<String>,
    },
    /// Create or overwrite an alert watch (checks the scripts first)
    Save {
        /// JSON file with the alert definition
        #[arg(long)]
        input: PathBuf,
    },
    /// Make sure the notification scripts exist
    CheckScripts,
    /// Compute process time and display term for an anomaly-detection job
    Timing { job_id: String },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the tally lines; fail when anything in the batch failed.
fn finish_batch(action: &str, outcome: BatchOutcome) -> Result<()> {
    outcome.report(
        |n, total| println!("{}: {} of {} succeeded", action, n, total),
        |n, total| eprintln!("{}: {} of {} failed", action, n, total),
    );
    if outcome.fail_count > 0 {
        anyhow::bail!("{}: {} alert(s) failed", action, outcome.fail_count);
    }
    Ok(())
}

async fn run(gateway: AlertGateway, command: Command) -> Result<()> {
    match command {
        Command::List { json } => {
            let response = gateway.search_list().await?;
            if json {
                return print_json(&response);
            }
            for row in WatchSummary::from_search_response(&response) {
                let state = match row.active {
                    Some(true) => "active",
                    Some(false) => "inactive",
                    None => "-",
                };
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.id,
                    state,
                    row.job_id.unwrap_or_default(),
                    row.actions.join(","),
                    row.description.unwrap_or_default()
                );
            }
            Ok(())
        }
        Command::Get { alert_id } => print_json(&gateway.search(&alert_id).await?),
        Command::Delete { alert_ids } => finish_batch("delete", gateway.delete(&alert_ids).await?),
        Command::Activate { alert_ids } => {
            finish_batch("activate", gateway.activate(&alert_ids).await?)
        }
        Command::Deactivate { alert_ids } => {
            finish_batch("deactivate", gateway.deactivate(&alert_ids).await?)
        }
        Command::BulkUpdate { input, alert_ids } => {
            let input: BulkUpdateInput = read_json(&input)?;
            finish_batch("bulk update", gateway.bulk_update(&alert_ids, &input).await?)
        }
        Command::Save { input } => {
            let definition: AlertDefinition = read_json(&input)?;
            let report = gateway
                .ensure_scripts()
                .await
                .context("Notification scripts are not available")?;
            for name in &report.created {
                println!("created script {}", name);
            }
            print_json(&gateway.save(&definition).await?)
        }
        Command::CheckScripts => print_json(&gateway.check_scripts().await?),
        Command::Timing { job_id } => print_json(&gateway.job_timing(&job_id).await?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set verbosity level (0-3)
    let verbosity = args.verbose.min(3);

    Config::ensure_log_directory().ok(); // Create log directory if needed
    ml_alert_gateway::init_tracing(verbosity, Some(Config::log_file_path()));
    tracing::debug!("ml-alert {}", Config::version());

    let settings = GatewaySettings::load(args.config.as_deref())?;
    let gateway = AlertGateway::from_settings(&settings).context("Failed to set up gateway")?;
    run(gateway, args.command).await
}
