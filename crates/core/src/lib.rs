//! Licenser Core - License-State Reconciliation
//!
//! This crate keeps a locally cached license verdict in step with a remote
//! licensing server:
//! - Activation, deactivation and periodic refresh against the server
//! - Interpretation of server responses into a persisted `LicenseRecord`
//! - Memoized validity queries used to gate product features
//!
//! The transport, the persistence slot, the scheduler and the host's auth
//! checks are injected through the `RemoteClient`, `LicenseStore`,
//! `Scheduler` and `AuthGuard` traits.

pub mod auth;
pub mod config;
pub mod error;
pub mod reconciler;
pub mod record;
pub mod remote;
pub mod schedule;
pub mod site;
pub mod store;

pub use auth::{AuthGuard, LocalOperator};
pub use config::LicenserConfig;
pub use error::{LicenseError, LicenseResult};
pub use reconciler::{FormAction, FormRequest, FormResponse, LicenseReconciler, Tick};
pub use record::{mask_key, Expiry, LicenseRecord, LicenseStatus, LicenseTerms, Quota};
pub use remote::{parse_response, RawResponse, RemoteClient, RemoteVerdict, RequestPayload, Route};
pub use schedule::{MemoryScheduler, ScheduleTable, ScheduledEvent, Scheduler};
pub use site::SiteContext;
pub use store::{derive_store_key, LicenseStore, MemoryStore};

/// Licenser version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
