//! `licenser check` — exit status reflects license validity

use anyhow::Result;
use licenser_core::LicenserConfig;
use std::process::ExitCode;

use crate::license::{self, gate};
use crate::output;
use crate::OutputFormat;

/// Exits 0 when the license is valid (and carries `attr = value` if given).
pub fn run(
    config: &LicenserConfig,
    attr_value: Option<(&str, &str)>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let reconciler = license::open_reconciler(config)?;
    let requirement = attr_value.map(|(attr, value)| gate::Requirement::new(attr, value));

    match gate::require(&reconciler, requirement.as_ref()) {
        Ok(()) => {
            output::print_check(true, None, format)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let detail = err.to_string();
            output::print_check(false, Some(&detail), format)?;
            if format == OutputFormat::Terminal {
                gate::warn(&err);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
