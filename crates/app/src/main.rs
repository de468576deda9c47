use clap::Parser;
use engine::{Clock, FileStorage, Ledger, ZonedClock};

mod cli;
mod config;
mod error;
mod run;

#[tokio::main]
async fn main() {
    if let Err(err) = start().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn start() -> error::Result<()> {
    let cli = cli::Cli::parse();
    let settings = config::load(&cli.overrides)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "kaasi={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let clock = ZonedClock::new(settings.tz()?);
    let mut storage = FileStorage::new(&settings.data_dir);
    if let Some(quota) = settings.quota_bytes {
        storage = storage.quota(quota);
    }
    tracing::debug!(dir = %storage.dir().display(), "opening store");

    let (mut ledger, report) = Ledger::builder(storage)
        .storage_key(&settings.storage_key)
        .clock(clock)
        .load_or_initialize()?;
    if report.corrupt {
        tracing::warn!("stored data was unreadable, starting from an empty ledger");
    }
    if !report.sanitize.is_clean() {
        tracing::info!(
            repairs = report.sanitize.repairs.len(),
            dropped = report.sanitize.dropped,
            "stored data was repaired on load"
        );
    }

    run::run(&mut ledger, cli.command, clock.today()).await
}
