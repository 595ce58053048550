// src/commands/process.rs
//! The ingestion batch

use anyhow::{Context, Result};
use repomgr::config::{IngestConfig, IngestOptions, Settings};
use repomgr::ingest::Ingestor;
use repomgr::poll::ThreadSleeper;
use repomgr::process::SystemRunner;
use tracing::info;

/// Process every enabled incoming directory once
///
/// A dry run executes the whole batch inside a database transaction that
/// is rolled back, so it logs what a real run would do and keeps nothing.
pub fn cmd_process_incoming(settings: &Settings, db_path: &str, options: IngestOptions) -> Result<()> {
    let config = IngestConfig::new(settings, options);
    let runner = SystemRunner::new(config.dry_run, config.verbose);
    let sleeper = ThreadSleeper;

    if config.dry_run {
        info!("Dry run: no commands are executed and no files are changed");
    }

    let mut conn = repomgr::db::open(db_path)?;
    let report = if config.dry_run {
        let tx = conn.transaction()?;
        let report = Ingestor::new(&tx, &config, &runner, &sleeper).run();
        tx.rollback()?;
        report
    } else {
        Ingestor::new(&conn, &config, &runner, &sleeper).run()
    }
    .context("Ingestion aborted")?;

    println!("{}", report.summary());
    for path in &report.failed {
        println!("  [FAILED] {}", path.display());
    }
    for path in &report.skipped {
        println!("  [SKIPPED] {}", path.display());
    }

    if report.has_failures() {
        anyhow::bail!(
            "{} item(s) failed; see the log for details",
            report.failed.len()
        );
    }
    Ok(())
}
