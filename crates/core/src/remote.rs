//! Remote licensing authority: request shape, transport seam, and response
//! interpretation
//!
//! The transport itself is a black box behind [`RemoteClient`]. Everything the
//! reconciler needs to know about a response is decided by
//! [`parse_response`], which only looks at the body.

use crate::error::{LicenseError, LicenseResult, MSG_TRY_AGAIN};
use crate::record::LicenseTerms;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Remote operation, addressed as `license/{product_hash}/{route}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Check,
    Activate,
    Deactivate,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Check => "check",
            Route::Activate => "activate",
            Route::Deactivate => "deactivate",
        }
    }

    pub fn path(&self, product_hash: &str) -> String {
        format!("license/{product_hash}/{}", self.as_str())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body sent with every license request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestPayload {
    pub license_key: String,

    #[serde(rename = "url")]
    pub calling_url: String,

    #[serde(rename = "is_local")]
    pub is_local_environment: bool,

    #[serde(rename = "version")]
    pub product_version: String,
}

/// What came back over the wire. The status code is informational only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Sends a license request to the licensing server.
pub trait RemoteClient {
    /// Returns the raw response, or [`LicenseError::Transport`] when no
    /// response arrived at all.
    fn send(&self, payload: &RequestPayload, route: &str) -> LicenseResult<RawResponse>;
}

/// Parsed remote response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteVerdict {
    Granted(LicenseTerms),
    Rejected { error: Option<String> },
}

impl RemoteVerdict {
    pub fn is_success(&self) -> bool {
        matches!(self, RemoteVerdict::Granted(_))
    }

    pub fn into_result(self) -> LicenseResult<LicenseTerms> {
        match self {
            RemoteVerdict::Granted(terms) => Ok(terms),
            RemoteVerdict::Rejected { error } => Err(LicenseError::rejection(error)),
        }
    }

    fn unknown() -> Self {
        RemoteVerdict::Rejected {
            error: Some(MSG_TRY_AGAIN.to_string()),
        }
    }
}

/// Interprets a response body.
///
/// - empty, non-JSON, non-object, or carrying `exception`: generic failure
/// - `errors.license_key[0]`: rejection with that message
/// - otherwise `success` decides; a failure keeps the server's `error`
pub fn parse_response(body: &str) -> RemoteVerdict {
    let map = match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(map)) if !map.is_empty() => map,
        _ => return RemoteVerdict::unknown(),
    };

    if map.contains_key("exception") {
        return RemoteVerdict::unknown();
    }

    if let Some(field_errors) = map.get("errors").and_then(|e| e.get("license_key")) {
        let first = field_errors
            .get(0)
            .or(Some(field_errors))
            .and_then(Value::as_str)
            .map(str::to_string);
        return RemoteVerdict::Rejected { error: first };
    }

    if !map.get("success").is_some_and(truthy) {
        let error = map.get("error").and_then(Value::as_str).map(str::to_string);
        return RemoteVerdict::Rejected { error };
    }

    match serde_json::from_value::<LicenseTerms>(Value::Object(map)) {
        Ok(terms) => RemoteVerdict::Granted(terms),
        Err(e) => {
            tracing::warn!("licensing server sent malformed terms: {e}");
            RemoteVerdict::unknown()
        }
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}
