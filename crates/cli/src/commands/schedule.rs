//! Schedule commands — schedule, unschedule, tick
//!
//! `tick` is meant to be run from cron or a systemd timer; it refreshes the
//! license only when the scheduled hook is due.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use licenser_core::{LicenserConfig, Tick};
use std::process::ExitCode;

use crate::license;
use crate::output;
use crate::OutputFormat;

pub fn schedule(config: &LicenserConfig, format: OutputFormat) -> Result<ExitCode> {
    let reconciler = license::open_reconciler(config)?;
    let scheduler = license::open_scheduler(config)?;

    let added = reconciler.schedule_refresh(&scheduler, Utc::now())?;
    if !added && format == OutputFormat::Terminal {
        eprintln!("  {} already scheduled", reconciler.hook_name().bold());
    }

    let table = scheduler.load()?;
    output::print_schedule(
        reconciler.hook_name(),
        table.is_scheduled(reconciler.hook_name()),
        table.next_run(reconciler.hook_name()),
        format,
    )?;
    Ok(ExitCode::SUCCESS)
}

pub fn unschedule(config: &LicenserConfig, format: OutputFormat) -> Result<ExitCode> {
    let reconciler = license::open_reconciler(config)?;
    let scheduler = license::open_scheduler(config)?;

    reconciler.clear_schedule(&scheduler)?;
    output::print_schedule(reconciler.hook_name(), false, None, format)?;
    Ok(ExitCode::SUCCESS)
}

pub fn tick(config: &LicenserConfig, format: OutputFormat) -> Result<ExitCode> {
    let reconciler = license::open_reconciler(config)?;
    let scheduler = license::open_scheduler(config)?;

    match reconciler.run_due(&scheduler, Utc::now())? {
        Tick::NotDue => {
            tracing::debug!(hook = reconciler.hook_name(), "nothing due");
        }
        Tick::NoKey => {
            tracing::info!(hook = reconciler.hook_name(), "due, but no license key on file");
        }
        Tick::Refreshed(record) => {
            output::print_status(Some(&record), format)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}
