//! Rendering of command results (terminal or JSON)

use chrono::{DateTime, Utc};
use colored::Colorize;
use licenser_core::{Expiry, FormResponse, LicenseRecord, LicenseStatus};
use serde::Serialize;
use serde_json::json;

use crate::OutputFormat;

pub fn print_form_response(resp: &FormResponse, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&form_response_json(resp)),
        OutputFormat::Terminal => {
            if resp.success {
                eprintln!("  {} {}", "\u{2713}".green(), resp.message.green());
            } else {
                eprintln!("  {} {}", "\u{2717}".red(), resp.message.red());
            }
            eprintln!();
            print_license(resp.license.as_ref());
            Ok(())
        }
    }
}

pub fn print_status(record: Option<&LicenseRecord>, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&record.map(summary)),
        OutputFormat::Terminal => {
            print_license(record);
            Ok(())
        }
    }
}

pub fn print_check(valid: bool, detail: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "valid": valid, "detail": detail })),
        OutputFormat::Terminal => {
            if valid {
                eprintln!("  {} License is valid", "\u{2713}".green());
            } else {
                eprintln!("  {} License is not valid", "\u{2717}".red());
            }
            Ok(())
        }
    }
}

pub fn print_schedule(
    hook: &str,
    scheduled: bool,
    next_run: Option<DateTime<Utc>>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "hook": hook,
            "scheduled": scheduled,
            "next_run": next_run,
        })),
        OutputFormat::Terminal => {
            match next_run {
                Some(at) if scheduled => eprintln!(
                    "  {} {} next runs at {}",
                    "\u{2713}".green(),
                    hook.bold(),
                    at.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                _ => eprintln!("  {} is not scheduled", hook.bold()),
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Form response with the record as [`summary`] shows it
pub fn form_response_json(resp: &FormResponse) -> serde_json::Value {
    json!({
        "success": resp.success,
        "message": resp.message,
        "license": resp.license.as_ref().map(summary),
    })
}

/// Record as shown to operators: masked key plus display labels
fn summary(record: &LicenseRecord) -> serde_json::Value {
    json!({
        "key": record.display_key(),
        "status": record.status,
        "title": record.terms.title,
        "activations": record.activations_label(),
        "expires": record.expiry_label(),
        "expiry_date": record.terms.expiry_date,
    })
}

fn print_license(record: Option<&LicenseRecord>) {
    let Some(record) = record.filter(|r| r.has_key()) else {
        eprintln!("  {}: {}", "Status".bold(), "no license".dimmed());
        eprintln!();
        return;
    };

    let status = match record.status {
        LicenseStatus::Activated => record.status.to_string().green(),
        LicenseStatus::Deactivated => record.status.to_string().red(),
    };
    eprintln!("  {}: {}", "Status".bold(), status);
    eprintln!("  {}: {}", "Key".bold(), record.display_key());

    if let Some(title) = &record.terms.title {
        eprintln!("  {}: {}", "Plan".bold(), title.cyan());
    }
    eprintln!("  {}: {}", "Activations".bold(), record.activations_label());

    let expiry = record.expiry_label();
    let expiry = match record.terms.expiry_days {
        Some(e @ Expiry::Days(_)) if e.is_expired() => expiry.red(),
        Some(e @ Expiry::Days(_)) if e.is_expiring_soon() => expiry.yellow(),
        _ => expiry.normal(),
    };
    eprintln!("  {}: {}", "Expires".bold(), expiry);
    eprintln!();
}
