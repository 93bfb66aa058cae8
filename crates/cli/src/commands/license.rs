//! License commands — activate, deactivate, refresh, status
//!
//! Each mutating command goes through the same form path a settings page
//! would, with the terminal operator as the authorized user.

use anyhow::Result;
use licenser_core::{FormAction, FormRequest, LicenserConfig, LocalOperator};
use std::io::{BufRead, Write};
use std::process::ExitCode;

use crate::license;
use crate::output;
use crate::OutputFormat;

pub fn activate(config: &LicenserConfig, key: &str, format: OutputFormat) -> Result<ExitCode> {
    submit(config, FormRequest::new(FormAction::Activate).with_key(key), format)
}

pub fn deactivate(config: &LicenserConfig, yes: bool, format: OutputFormat) -> Result<ExitCode> {
    if !yes && !confirm("Are you sure you want to deactivate this license?")? {
        eprintln!("  Aborted.");
        return Ok(ExitCode::FAILURE);
    }
    submit(config, FormRequest::new(FormAction::Deactivate), format)
}

pub fn refresh(config: &LicenserConfig, format: OutputFormat) -> Result<ExitCode> {
    submit(config, FormRequest::new(FormAction::Refresh), format)
}

pub fn status(config: &LicenserConfig, format: OutputFormat) -> Result<ExitCode> {
    let reconciler = license::open_reconciler(config)?;
    let record = reconciler.license()?;
    output::print_status(record.as_ref(), format)?;
    Ok(ExitCode::SUCCESS)
}

fn submit(config: &LicenserConfig, request: FormRequest, format: OutputFormat) -> Result<ExitCode> {
    let reconciler = license::open_reconciler(config)?;
    let response = reconciler.submit_form(&request, &LocalOperator)?;
    output::print_form_response(&response, format)?;
    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("  {question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
