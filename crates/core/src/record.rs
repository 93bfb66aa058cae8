//! The persisted license record and the values it is built from

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Days-left threshold under which an expiry is highlighted
pub const EXPIRING_SOON_DAYS: i64 = 21;

/// Local verdict for a product's license
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    #[serde(alias = "activate")]
    Activated,
    #[default]
    #[serde(alias = "deactivate")]
    Deactivated,
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LicenseStatus::Activated => write!(f, "Activated"),
            LicenseStatus::Deactivated => write!(f, "Deactivated"),
        }
    }
}

/// Activation slot count: a number or unlimited
///
/// Accepts an integer, a numeric string, or `"unlimited"` on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Limited(i64),
    Unlimited,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QuotaRepr {
    Int(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for Quota {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match QuotaRepr::deserialize(deserializer)? {
            QuotaRepr::Int(n) => Ok(Quota::Limited(n)),
            QuotaRepr::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("unlimited") {
                    Ok(Quota::Unlimited)
                } else {
                    s.parse::<i64>().map(Quota::Limited).map_err(|_| {
                        serde::de::Error::custom(format!("invalid activation quota: {s:?}"))
                    })
                }
            }
        }
    }
}

impl Serialize for Quota {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Quota::Limited(n) => serializer.serialize_i64(*n),
            Quota::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Limited(n) => write!(f, "{n}"),
            Quota::Unlimited => write!(f, "Unlimited"),
        }
    }
}

/// Days until expiry, or a perpetual license
///
/// `false`, `"never"` and `""` all mean perpetual on input; perpetual is
/// written back as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Days(i64),
    Never,
}

impl Expiry {
    pub fn is_expired(&self) -> bool {
        matches!(self, Expiry::Days(d) if *d <= 0)
    }

    pub fn is_expiring_soon(&self) -> bool {
        matches!(self, Expiry::Days(d) if *d <= EXPIRING_SOON_DAYS)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiryRepr {
    Int(i64),
    Flag(bool),
    Text(String),
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ExpiryRepr::deserialize(deserializer)? {
            ExpiryRepr::Int(n) => Ok(Expiry::Days(n)),
            ExpiryRepr::Flag(false) => Ok(Expiry::Never),
            ExpiryRepr::Flag(true) => Err(serde::de::Error::custom(
                "expiry_days cannot be `true`",
            )),
            ExpiryRepr::Text(s) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("never") {
                    Ok(Expiry::Never)
                } else {
                    s.parse::<i64>().map(Expiry::Days).map_err(|_| {
                        serde::de::Error::custom(format!("invalid expiry_days: {s:?}"))
                    })
                }
            }
        }
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expiry::Days(n) => serializer.serialize_i64(*n),
            Expiry::Never => serializer.serialize_bool(false),
        }
    }
}

/// Accepts `YYYY-MM-DD` with an optional trailing time; anything else is absent.
fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.trim().get(..10))
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()))
}

/// Plan terms granted by the licensing server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseTerms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Quota>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_limit: Option<Quota>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_days: Option<Expiry>,

    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// The one record kept per product
///
/// Invariants: `Activated` implies a non-empty key; an explicit deactivation
/// leaves `key` empty and drops the terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub status: LicenseStatus,

    #[serde(flatten)]
    pub terms: LicenseTerms,
}

impl LicenseRecord {
    pub fn activated(key: impl Into<String>, terms: LicenseTerms) -> Self {
        Self {
            key: key.into(),
            status: LicenseStatus::Activated,
            terms,
        }
    }

    /// The resting state after an explicit deactivation.
    pub fn deactivated() -> Self {
        Self::default()
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }

    /// Key present and status activated.
    pub fn is_active(&self) -> bool {
        self.has_key() && self.status == LicenseStatus::Activated
    }

    /// Applies a successful refresh verdict, keeping the key.
    pub fn apply_terms(&mut self, terms: LicenseTerms) {
        self.status = LicenseStatus::Activated;
        self.terms = terms;
    }

    /// Applies a failed refresh verdict. The key stays on file.
    pub fn revoke(&mut self) {
        self.status = LicenseStatus::Deactivated;
        self.terms.expiry_days = Some(Expiry::Days(0));
    }

    /// Looks up a field by its stored name (`title`, `expiry_date`, ...).
    pub fn attribute(&self, name: &str) -> Option<serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(mut map)) => map.remove(name),
            _ => None,
        }
    }

    /// Value to prefill a key input with: masked once activated.
    pub fn display_key(&self) -> String {
        if self.status == LicenseStatus::Activated {
            mask_key(&self.key)
        } else {
            self.key.clone()
        }
    }

    /// `"3 out of 5"`, or `"Unlimited"` when the limit is absent, zero or
    /// unlimited.
    pub fn activations_label(&self) -> String {
        match self.terms.activation_limit {
            None | Some(Quota::Unlimited) | Some(Quota::Limited(0)) => "Unlimited".to_string(),
            Some(limit) => {
                let remaining = self.terms.remaining.unwrap_or(Quota::Limited(0));
                format!("{remaining} out of {limit}")
            }
        }
    }

    /// `"Jan 01, 2025 (10 days left)"`, `"... (Expired)"` or `"Never"`.
    pub fn expiry_label(&self) -> String {
        let days = match self.terms.expiry_days {
            None | Some(Expiry::Never) => return "Never".to_string(),
            Some(Expiry::Days(d)) => d,
        };
        let suffix = if days > 0 {
            format!("{days} days left")
        } else {
            "Expired".to_string()
        };
        match self.terms.expiry_date {
            Some(date) => format!("{} ({suffix})", date.format("%b %d, %Y")),
            None => suffix,
        }
    }
}

/// Left half of the key in plaintext, the rest masked with `*`.
///
/// Works on characters, so the output has as many characters as the input.
pub fn mask_key(key: &str) -> String {
    let len = key.chars().count();
    let visible = len / 2;
    key.chars()
        .take(visible)
        .chain(std::iter::repeat('*').take(len - visible))
        .collect()
}
