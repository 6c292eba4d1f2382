use anyhow::Result;
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use console::style;
use std::io::Read;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use idlectl::aws::{load_sdk_config, CloudWatchMetrics, Ec2Inventory};
use idlectl::config::{init_config, Config};
use idlectl::model::InstanceRecord;
use idlectl::notify::WhatsAppNotifier;
use idlectl::scan::{self, ScanEvent};
use idlectl::secrets::fetch_twilio_credentials;

#[derive(Parser)]
#[command(name = "idlectl")]
#[command(
    about = "EC2 idle-instance monitor",
    long_about = "idlectl scans a region's EC2 instances, classifies each as idle or active\nbased on trailing-window CloudWatch CPU utilization, writes a timestamped\nJSON report, and sends a WhatsApp alert for the idle set.\n\nAn instance is idle when it is running and its 7-day average CPU\nutilization is strictly below the threshold."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a region and classify idle instances
    Scan {
        /// AWS region to scan
        #[arg(long)]
        region: Option<String>,
        /// CPU utilization threshold (percent) for idle instances
        #[arg(long)]
        threshold: Option<f64>,
        /// Skip writing the JSON report
        #[arg(long)]
        no_report: bool,
        /// Skip the WhatsApp notification
        #[arg(long)]
        no_notify: bool,
        /// Secrets Manager secret holding the Twilio credentials
        #[arg(long, env = "IDLECTL_TWILIO_SECRET")]
        twilio_secret: Option<String>,
    },
    /// Run the scheduler-event entry point (JSON event from file or stdin)
    Event {
        /// Event payload file; reads stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Initialize monitor configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".idlectl.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            region,
            threshold,
            no_report,
            no_notify,
            twilio_secret,
        } => {
            if let Some(region) = region {
                config.region = region;
            }
            if let Some(threshold) = threshold {
                config.threshold = threshold;
            }
            if let Some(secret) = twilio_secret {
                config.twilio_secret_name = secret;
            }
            config.write_report = config.write_report && !no_report;
            config.send_notifications = config.send_notifications && !no_notify;
            config.validate()?;

            let records = execute_run(&config).await;
            print_records(&records, &cli.output)?;
        }
        Commands::Event { file } => {
            let raw = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let event: ScanEvent = if raw.trim().is_empty() {
                ScanEvent::default()
            } else {
                serde_json::from_str(&raw)?
            };
            event.apply(&mut config);
            config.validate()?;

            let (inventory, metrics, notifier) = build_collaborators(&config).await;
            let response =
                scan::handle_event(&config, &inventory, &metrics, notifier.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Init { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}

async fn build_collaborators(
    config: &Config,
) -> (Ec2Inventory, CloudWatchMetrics, Option<WhatsAppNotifier>) {
    let sdk_config = load_sdk_config(&config.region).await;
    let inventory = Ec2Inventory::new(&sdk_config, &config.region);
    let metrics = CloudWatchMetrics::new(&sdk_config, config.window_days, config.period_seconds);

    let notifier = if config.send_notifications {
        match fetch_twilio_credentials(&sdk_config, &config.twilio_secret_name).await {
            Ok(credentials) => Some(WhatsAppNotifier::new(credentials)),
            Err(e) => {
                // Missing credentials abort only the notification step.
                warn!("Twilio credentials unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    (inventory, metrics, notifier)
}

async fn execute_run(config: &Config) -> Vec<InstanceRecord> {
    let (inventory, metrics, notifier) = build_collaborators(config).await;
    scan::run_monitor(config, &inventory, &metrics, notifier.as_ref()).await
}

fn print_records(records: &[InstanceRecord], output: &str) -> Result<()> {
    if output == "json" {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No EC2 instances found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Instance", "State", "Type", "Avg CPU", "Launched", "Idle"]);
    for record in records {
        let cpu = record
            .average_cpu
            .map(|v| format!("{}%", v))
            .unwrap_or_else(|| "-".to_string());
        let launched = record
            .launch_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let idle = if record.idle {
            style("IDLE").red().bold().to_string()
        } else {
            "-".to_string()
        };
        table.add_row(vec![
            Cell::new(&record.instance_id),
            Cell::new(&record.state),
            Cell::new(&record.instance_type),
            Cell::new(cpu),
            Cell::new(launched),
            Cell::new(idle),
        ]);
    }
    println!("{table}");

    let idle_count = records.iter().filter(|r| r.idle).count();
    println!(
        "{} instances scanned, {} idle",
        records.len(),
        idle_count
    );
    Ok(())
}
