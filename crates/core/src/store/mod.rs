//! License record persistence
//!
//! A `LicenseStore` is a durable keyed map holding one `LicenseRecord` per
//! product. Writes overwrite; nothing is ever appended or deleted.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::LicenseResult;
use crate::record::LicenseRecord;
use sha2::{Digest, Sha256};

/// Keyed persistence slot for license records
pub trait LicenseStore {
    /// Returns the stored record, or `None` if nothing was ever written.
    fn get(&self, key: &str) -> LicenseResult<Option<LicenseRecord>>;

    /// Overwrites the record stored under `key`.
    fn set(&self, key: &str, record: &LicenseRecord) -> LicenseResult<()>;
}

/// Store key for a product: `licenser_<hash>_manage_license`, where the hash
/// is the first 16 bytes of SHA-256 over the slug.
pub fn derive_store_key(slug: &str) -> String {
    let hash = Sha256::digest(slug.as_bytes());
    format!("licenser_{}_manage_license", hex::encode(&hash[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key_is_deterministic() {
        assert_eq!(derive_store_key("acme-forms"), derive_store_key("acme-forms"));
        assert_ne!(derive_store_key("acme-forms"), derive_store_key("acme-shop"));
    }

    #[test]
    fn store_key_shape() {
        let key = derive_store_key("acme-forms");
        let hash = key
            .strip_prefix("licenser_")
            .and_then(|k| k.strip_suffix("_manage_license"))
            .unwrap();
        assert_eq!(hash.len(), 32, "Expected 32 hex chars, got: {hash}");
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
