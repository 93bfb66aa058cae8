//! On-disk license store (`~/.config/licenser/` by default)

use licenser_core::{LicenseError, LicenseRecord, LicenseResult, LicenseStore};
use std::path::{Path, PathBuf};

/// One JSON file per store key
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &str) -> LicenseResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(LicenseError::Storage(format!("invalid store key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LicenseStore for FileStore {
    fn get(&self, key: &str) -> LicenseResult<Option<LicenseRecord>> {
        let path = self.record_path(key)?;
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set(&self, key: &str, record: &LicenseRecord) -> LicenseResult<()> {
        let path = self.record_path(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(record)?;

        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
