//! # Dashboard Report
//!
//! Prints the dashboard as JSON, for cron mails and quick checks from a
//! shell on the shop machine.
//!
//! ## Usage
//! ```bash
//! # This week, default config location
//! cargo run -p fixit-service --bin fixit-report
//!
//! # Last 30 days from an explicit config file
//! cargo run -p fixit-service --bin fixit-report -- --period month --config ./shop.toml
//! ```
//!
//! Runs as the MAINTENANCE role, which may read the dashboard but change
//! nothing.

use std::env;
use std::path::PathBuf;

use fixit_core::{Caller, Period, Role};
use fixit_service::{init_tracing, ShopConfig, ShopService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut period = Period::Week;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--period" | "-p" => {
                if i + 1 < args.len() {
                    period = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("FixIt Shop Dashboard Report");
                println!();
                println!("Usage: fixit-report [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --period <week|month>  Trailing window (default: week)");
                println!("  -c, --config <PATH>        Config file (default: platform config dir)");
                println!("  -h, --help                 Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let config = ShopConfig::load(config_path)?;
    let service = ShopService::from_config(&config).await?;

    let caller = Caller::new("fixit-report", Role::Maintenance);
    let stats = service.dashboard_stats(&caller, period).await?;

    println!("{}", serde_json::to_string_pretty(&stats)?);

    service.db().close().await;
    Ok(())
}
