//! Configuration file parsing for licenser.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LicenseError, LicenseResult};
use crate::schedule::hook_name;
use crate::site::SiteContext;
use crate::store::derive_store_key;

pub const CONFIG_FILENAME: &str = "licenser.toml";

/// Replaces `remote.api_url` when set
pub const API_URL_ENV: &str = "LICENSER_API_URL";

/// Upper bound for `schedule.interval_hours` (one year)
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

/// Upper bound for `schedule.initial_delay_secs` (one day)
pub const MAX_INITIAL_DELAY_SECS: u64 = 24 * 60 * 60;

/// Main configuration structure for licenser.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenserConfig {
    #[serde(default)]
    pub product: ProductConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Short identifier; drives the store key and schedule hook
    #[serde(default)]
    pub slug: String,

    /// Product hash assigned by the licensing server, used in routes
    #[serde(default)]
    pub hash: String,

    /// Version reported with every request
    #[serde(default = "default_version")]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL routes are joined onto
    #[serde(default)]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Calling URL reported to the licensing server
    #[serde(default)]
    pub url: String,

    /// Overrides local-environment detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_local: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Overrides the derived store key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Overrides the on-disk location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Delay of the one-shot refresh that follows scheduling
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
}

// Default functions
fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_interval_hours() -> u64 {
    24
}

fn default_initial_delay_secs() -> u64 {
    20
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            hash: String::new(),
            version: default_version(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_hours: default_interval_hours(),
            initial_delay_secs: default_initial_delay_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> LicenseResult<Duration> {
        self.interval_hours
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                LicenseError::Config(format!(
                    "schedule.interval_hours {} is out of range",
                    self.interval_hours
                ))
            })
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

impl LicenserConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> LicenseResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LicenseError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> LicenseResult<Self> {
        toml::from_str(contents).map_err(|e| LicenseError::Config(e.to_string()))
    }

    /// Find and load licenser.toml from the given directory or its ancestors
    pub fn find_and_load(start_dir: &Path) -> LicenseResult<Self> {
        let mut current = start_dir;

        loop {
            let config_path = current.join(CONFIG_FILENAME);
            if config_path.exists() {
                return Self::from_file(&config_path);
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // No config found, use defaults
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> LicenseResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| LicenseError::Config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Applies `LICENSER_API_URL` if present and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.remote.api_url = url.trim().to_string();
            }
        }
    }

    /// Rejects a configuration the reconciler cannot work with, naming the
    /// first offending field.
    pub fn validate(&self) -> LicenseResult<()> {
        let required = [
            ("product.slug", &self.product.slug),
            ("product.hash", &self.product.hash),
            ("remote.api_url", &self.remote.api_url),
            ("site.url", &self.site.url),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(LicenseError::Config(format!("{field} must be set")));
        }
        if self.schedule.interval_hours == 0 {
            return Err(LicenseError::Config(
                "schedule.interval_hours must be greater than zero".to_string(),
            ));
        }
        if self.schedule.interval_hours > MAX_INTERVAL_HOURS {
            return Err(LicenseError::Config(format!(
                "schedule.interval_hours must be at most {MAX_INTERVAL_HOURS}"
            )));
        }
        if self.schedule.initial_delay_secs > MAX_INITIAL_DELAY_SECS {
            return Err(LicenseError::Config(format!(
                "schedule.initial_delay_secs must be at most {MAX_INITIAL_DELAY_SECS}"
            )));
        }
        Ok(())
    }

    /// Store key for this product, honoring `store.key`.
    pub fn store_key(&self) -> String {
        match self.store.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => derive_store_key(&self.product.slug),
        }
    }

    pub fn hook_name(&self) -> String {
        hook_name(&self.product.slug)
    }

    pub fn site(&self) -> SiteContext {
        SiteContext::new(self.site.url.clone(), self.site.is_local)
    }
}
