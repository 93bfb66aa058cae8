//! In-memory license store

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{LicenseError, LicenseResult};
use crate::record::LicenseRecord;

use super::LicenseStore;

/// License store backed by `HashMap<String, LicenseRecord>`
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, LicenseRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LicenseStore for MemoryStore {
    fn get(&self, key: &str) -> LicenseResult<Option<LicenseRecord>> {
        let records = self
            .records
            .read()
            .map_err(|e| LicenseError::Storage(format!("lock poisoned: {e}")))?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, record: &LicenseRecord) -> LicenseResult<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| LicenseError::Storage(format!("lock poisoned: {e}")))?;
        records.insert(key.to_string(), record.clone());
        Ok(())
    }
}
