//! # Slot Booker
//!
//! Operator tooling over the booking ledger: seed wanted timeslots, inspect
//! the ledger and the current wishlist, correct a status by hand and check
//! the configuration. Booking runs themselves are started by programs that
//! embed the library with their own browser collaborators.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use slot_booker::clock::{Clock, SystemClock};
use slot_booker::config::ConfigManager;
use slot_booker::ledger::{FileLedger, Ledger, SlotStatus, Timeslot};
use slot_booker::logging::{init_structured_logging, LogFormat};
use slot_booker::probe::parse_vendor_timestamp;
use slot_booker::wishlist::WishlistSelector;

#[derive(Parser)]
#[command(name = "slot-booker")]
#[command(about = "Manage the class booking ledger")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: slot-booker.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ledger file, overriding the configured path
    #[arg(short, long, global = true)]
    ledger: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json)
    #[arg(long, global = true, default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add wanted timeslots, skipping ones already in the ledger
    Seed {
        /// Timestamps such as "2024-03-21 11:30:00"
        #[arg(required = true)]
        timestamps: Vec<String>,

        /// Parse timestamps in the site's format ("Thu. Mar 21, 2024 11:30 AM")
        #[arg(long)]
        vendor: bool,
    },

    /// Print every ledger record
    List {
        #[arg(long)]
        json: bool,
    },

    /// Print the timeslots a run would currently try to book
    Wishlist {
        #[arg(long)]
        json: bool,
    },

    /// Set the status of an existing record
    Mark {
        timestamp: String,
        /// wanted, booked or waitlisted
        status: SlotStatus,
    },

    /// Load, validate and print the configuration with secrets masked
    CheckConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_structured_logging(cli.log_format, cli.verbose);

    match &cli.command {
        Commands::Seed { timestamps, vendor } => seed(&cli, timestamps, *vendor),
        Commands::List { json } => list(&cli, *json),
        Commands::Wishlist { json } => wishlist(&cli, *json),
        Commands::Mark { timestamp, status } => mark(&cli, timestamp, *status),
        Commands::CheckConfig => check_config(&cli),
    }
}

/// An explicit `--config` must load; the implicit default may be absent
fn load_config(cli: &Cli) -> Result<Option<Arc<ConfigManager>>> {
    match &cli.config {
        Some(path) => ConfigManager::load(Some(path.clone()))
            .map(Some)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => match ConfigManager::load(None) {
            Ok(manager) => Ok(Some(manager)),
            Err(e) => {
                tracing::debug!(error = %e, "No usable default configuration, using defaults");
                Ok(None)
            }
        },
    }
}

fn open_ledger(cli: &Cli, config: Option<&ConfigManager>) -> FileLedger {
    let path = cli
        .ledger
        .clone()
        .or_else(|| config.map(|m| m.config().ledger.path.clone()))
        .unwrap_or_else(|| PathBuf::from(slot_booker::constants::defaults::LEDGER_PATH));
    FileLedger::new(path)
}

fn parse_timeslot(text: &str, vendor: bool) -> Result<Timeslot> {
    let parsed = if vendor {
        parse_vendor_timestamp(text)
    } else {
        text.parse()
    };
    parsed.with_context(|| format!("invalid timestamp '{text}'"))
}

fn seed(cli: &Cli, timestamps: &[String], vendor: bool) -> Result<()> {
    let config = load_config(cli)?;
    let ledger = open_ledger(cli, config.as_deref());

    let parsed = timestamps
        .iter()
        .map(|t| parse_timeslot(t, vendor))
        .collect::<Result<Vec<_>>>()?;
    let inserted = ledger.bulk_insert(&parsed, SlotStatus::Wanted)?;

    println!(
        "Seeded {inserted} of {} timeslots into {}",
        parsed.len(),
        ledger.path().display()
    );
    Ok(())
}

fn list(cli: &Cli, json: bool) -> Result<()> {
    let config = load_config(cli)?;
    let ledger = open_ledger(cli, config.as_deref());
    let records = ledger.load()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("Ledger {} is empty", ledger.path().display());
    } else {
        for record in &records {
            println!("{}  {}", record.timestamp, record.status);
        }
    }
    Ok(())
}

fn wishlist(cli: &Cli, json: bool) -> Result<()> {
    let config = load_config(cli)?;
    let ledger = open_ledger(cli, config.as_deref());
    let window = config
        .as_deref()
        .map(|m| m.config().window)
        .unwrap_or_default()
        .to_window();

    let clock = SystemClock;
    let selector = WishlistSelector::new(window);
    let wanted = selector.select_from(&ledger, &clock)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&wanted)?);
        return Ok(());
    }

    let (start, end) = window.bounds(clock.now());
    println!("Window: {start} .. {end}");
    if wanted.is_empty() {
        println!("Nothing to do");
    }
    for timeslot in &wanted {
        println!("{timeslot}");
    }
    Ok(())
}

fn mark(cli: &Cli, timestamp: &str, status: SlotStatus) -> Result<()> {
    let config = load_config(cli)?;
    let ledger = open_ledger(cli, config.as_deref());
    let timeslot = parse_timeslot(timestamp, false)?;

    ledger
        .upsert_status(&timeslot, status)
        .with_context(|| format!("failed to mark {timeslot} as {status}"))?;
    println!("{timeslot} is now {status}");
    Ok(())
}

fn check_config(cli: &Cli) -> Result<()> {
    let manager = ConfigManager::load(cli.config.clone()).context("configuration is invalid")?;

    println!("✓ Configuration is valid");
    if let Some(source) = manager.source() {
        println!("  source: {}", source.display());
    }
    println!("{}", serde_json::to_string_pretty(&manager.debug_config())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mark_parses_status() {
        let cli = Cli::try_parse_from([
            "slot-booker",
            "--ledger",
            "/tmp/ledger.csv",
            "mark",
            "2024-03-21 11:30:00",
            "Booked",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Mark {
                status: SlotStatus::Booked,
                ..
            }
        ));
    }

    #[test]
    fn test_vendor_seed_parsing() {
        let ts = parse_timeslot("Thu. Mar 21, 2024 11:30 AM", true).unwrap();
        assert_eq!(ts.to_string(), "2024-03-21 11:30:00");
        assert!(parse_timeslot("Thu. Mar 21, 2024 11:30 AM", false).is_err());
    }
}
