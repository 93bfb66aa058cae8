//! Host authorization seam for form submissions

use crate::error::{LicenseError, LicenseResult, MSG_NONCE_FAILED, MSG_NO_PERMISSION};

/// The host's CSRF and capability primitives
pub trait AuthGuard {
    /// Verifies the request nonce. `None` means the form carried no nonce.
    fn verify_nonce(&self, nonce: Option<&str>) -> bool;

    /// Whether the current user may manage the license.
    fn can_manage(&self) -> bool;

    /// Nonce first, then capability.
    fn authorize(&self, nonce: Option<&str>) -> LicenseResult<()> {
        if !self.verify_nonce(nonce) {
            return Err(LicenseError::Unauthorized(MSG_NONCE_FAILED.to_string()));
        }
        if !self.can_manage() {
            return Err(LicenseError::Unauthorized(MSG_NO_PERMISSION.to_string()));
        }
        Ok(())
    }
}

/// Guard for a local operator at a terminal. Allows every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOperator;

impl AuthGuard for LocalOperator {
    fn verify_nonce(&self, _nonce: Option<&str>) -> bool {
        true
    }

    fn can_manage(&self) -> bool {
        true
    }
}
