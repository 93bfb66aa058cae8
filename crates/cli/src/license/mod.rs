//! Host side of the license reconciler
//!
//! Wires the core reconciler to an HTTP transport, a file-backed store and a
//! file-backed schedule under the data directory.

pub mod cache;
pub mod client;
pub mod gate;
pub mod schedule;

use anyhow::{Context, Result};
use licenser_core::{LicenseReconciler, LicenserConfig};
use std::path::PathBuf;

pub use cache::FileStore;
pub use client::HttpClient;
pub use schedule::FileScheduler;

/// The reconciler as the CLI runs it
pub type Reconciler = LicenseReconciler<HttpClient, FileStore>;

/// Data directory: `store.dir`, or `~/.config/licenser/`.
pub fn data_dir(config: &LicenserConfig) -> Result<PathBuf> {
    if let Some(dir) = &config.store.dir {
        return Ok(dir.clone());
    }
    let base = dirs::config_dir().context("could not determine config directory")?;
    Ok(base.join("licenser"))
}

pub fn open_reconciler(config: &LicenserConfig) -> Result<Reconciler> {
    let dir = data_dir(config)?;
    let client = HttpClient::new(config)?;
    tracing::debug!(dir = %dir.display(), "opening license store");
    Ok(LicenseReconciler::new(config, client, FileStore::new(dir)))
}

pub fn open_scheduler(config: &LicenserConfig) -> Result<FileScheduler> {
    Ok(FileScheduler::new(&data_dir(config)?))
}
