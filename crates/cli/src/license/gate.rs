//! Feature gating on the stored license

use colored::Colorize;
use licenser_core::{LicenseReconciler, LicenseStore, RemoteClient};
use serde_json::Value;

/// An attribute the license must carry, e.g. `title = "Pro"`
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub attribute: String,
    pub value: Value,
}

impl Requirement {
    pub fn new(attribute: impl Into<String>, raw_value: &str) -> Self {
        Self {
            attribute: attribute.into(),
            value: parse_value(raw_value),
        }
    }
}

/// Reads a command-line value as JSON when it parses, otherwise as a string.
///
/// `5` matches a numeric attribute, `"5"` a string one, `unlimited` the
/// unlimited quota.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GateError {
    #[error("no active license")]
    NotActive,

    #[error("license {attribute} does not match {expected}")]
    Mismatch { attribute: String, expected: Value },
}

/// `Ok(())` when the license is valid and satisfies `requirement`, if any.
pub fn require<C: RemoteClient, S: LicenseStore>(
    reconciler: &LicenseReconciler<C, S>,
    requirement: Option<&Requirement>,
) -> Result<(), GateError> {
    if !reconciler.is_valid() {
        return Err(GateError::NotActive);
    }
    match requirement {
        Some(req) if !reconciler.is_valid_by(&req.attribute, req.value.clone()) => {
            Err(GateError::Mismatch {
                attribute: req.attribute.clone(),
                expected: req.value.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Prints why a gate failed to stderr.
pub fn warn(err: &GateError) {
    eprintln!(
        "  {} {}. Run '{}' to manage the license.",
        "\u{26a1}".yellow(),
        err.to_string().bold(),
        "licenser activate <KEY>".bold(),
    );
}
