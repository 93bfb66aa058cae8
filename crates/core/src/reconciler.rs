//! License reconciliation
//!
//! [`LicenseReconciler`] owns the product's record in the store. It talks to
//! the licensing server, folds the verdict into the record, and answers
//! validity queries from the record.
//!
//! State transitions of one product's record:
//!
//! ```text
//! [no record]   --activate ok-------> [activated]
//! [activated]   --deactivate--------> [deactivated] (always, key cleared)
//! [activated]   --refresh ok--------> [activated]   (terms updated)
//! [activated]   --refresh failed----> [deactivated] (key kept)
//! [deactivated] --activate ok-------> [activated]
//! ```
//!
//! A reconciler is request-scoped: it memoizes `is_valid()` for its own
//! lifetime and is neither `Sync` nor meant to be shared.

use std::cell::Cell;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::AuthGuard;
use crate::config::{LicenserConfig, ScheduleConfig};
use crate::error::{
    LicenseError, LicenseResult, MSG_ACTIVATED, MSG_DEACTIVATED, MSG_KEY_NOT_FOUND,
    MSG_KEY_REQUIRED, MSG_REFRESHED,
};
use crate::record::{mask_key, LicenseRecord};
use crate::remote::{parse_response, RemoteClient, RemoteVerdict, RequestPayload, Route};
use crate::schedule::{ScheduledEvent, Scheduler};
use crate::site::SiteContext;
use crate::store::LicenseStore;

/// Action requested by a license form submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Activate,
    Deactivate,
    Refresh,
}

impl FromStr for FormAction {
    type Err = LicenseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "activate" => Ok(FormAction::Activate),
            "deactive" | "deactivate" => Ok(FormAction::Deactivate),
            "refresh" => Ok(FormAction::Refresh),
            other => Err(LicenseError::Validation(format!(
                "Unknown license action: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRequest {
    pub action: FormAction,
    pub license_key: Option<String>,
    pub nonce: Option<String>,
}

impl FormRequest {
    pub fn new(action: FormAction) -> Self {
        Self {
            action,
            license_key: None,
            nonce: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.license_key = Some(key.into());
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}

/// Message plus the record as it stands after the action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormResponse {
    pub success: bool,
    pub message: String,
    pub license: Option<LicenseRecord>,
}

/// Result of a scheduler tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    NotDue,
    NoKey,
    Refreshed(LicenseRecord),
}

pub struct LicenseReconciler<C, S> {
    client: C,
    store: S,
    slug: String,
    product_hash: String,
    product_version: String,
    store_key: String,
    hook: String,
    site: SiteContext,
    schedule: ScheduleConfig,
    valid: Cell<Option<bool>>,
}

impl<C: RemoteClient, S: LicenseStore> LicenseReconciler<C, S> {
    pub fn new(config: &LicenserConfig, client: C, store: S) -> Self {
        Self {
            client,
            store,
            slug: config.product.slug.clone(),
            product_hash: config.product.hash.clone(),
            product_version: config.product.version.clone(),
            store_key: config.store_key(),
            hook: config.hook_name(),
            site: config.site(),
            schedule: config.schedule.clone(),
            valid: Cell::new(None),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    pub fn hook_name(&self) -> &str {
        &self.hook
    }

    /// The stored record, if any was ever written.
    pub fn license(&self) -> LicenseResult<Option<LicenseRecord>> {
        self.store.get(&self.store_key)
    }

    /// The stored record, only if it still carries a key.
    fn keyed_license(&self) -> LicenseResult<Option<LicenseRecord>> {
        Ok(self.license()?.filter(LicenseRecord::has_key))
    }

    fn persist(&self, record: &LicenseRecord) -> LicenseResult<()> {
        self.store.set(&self.store_key, record)?;
        self.valid.set(None);
        Ok(())
    }

    fn send(&self, route: Route, license_key: &str) -> LicenseResult<RemoteVerdict> {
        let payload = RequestPayload {
            license_key: license_key.to_string(),
            calling_url: self.site.url.clone(),
            is_local_environment: self.site.is_local,
            product_version: self.product_version.clone(),
        };
        let path = route.path(&self.product_hash);
        debug!(product = %self.slug, %route, key = %mask_key(license_key), "sending license request");

        let response = self.client.send(&payload, &path).inspect_err(|e| {
            warn!(product = %self.slug, %route, "license request failed: {e}");
        })?;
        let verdict = parse_response(&response.body);
        if let RemoteVerdict::Rejected { error } = &verdict {
            warn!(
                product = %self.slug,
                %route,
                status = response.status,
                error = error.as_deref().unwrap_or("<none>"),
                "licensing server rejected request"
            );
        }
        Ok(verdict)
    }

    /// Read-only remote query. Never touches the store.
    pub fn check(&self, license_key: &str) -> LicenseResult<RemoteVerdict> {
        self.send(Route::Check, license_key)
    }

    /// Activates `license_key` and overwrites the stored record on success.
    ///
    /// Fails without a remote call when the key is blank; any failure leaves
    /// the store untouched.
    pub fn activate(&self, license_key: &str) -> LicenseResult<LicenseRecord> {
        let license_key = license_key.trim();
        if license_key.is_empty() {
            return Err(LicenseError::Validation(MSG_KEY_REQUIRED.to_string()));
        }

        let terms = self.send(Route::Activate, license_key)?.into_result()?;
        let record = LicenseRecord::activated(license_key, terms);
        self.persist(&record)?;

        info!(
            product = %self.slug,
            key = %mask_key(license_key),
            title = record.terms.title.as_deref().unwrap_or(""),
            "license activated"
        );
        Ok(record)
    }

    /// Deactivates the stored key.
    ///
    /// The local record is cleared before the remote outcome is looked at, so
    /// a failed remote call still returns an error but the license is off.
    pub fn deactivate(&self) -> LicenseResult<LicenseRecord> {
        let Some(LicenseRecord { key, .. }) = self.keyed_license()? else {
            return Err(LicenseError::NotFound(MSG_KEY_NOT_FOUND.to_string()));
        };

        let outcome = self
            .send(Route::Deactivate, &key)
            .and_then(RemoteVerdict::into_result);

        let record = LicenseRecord::deactivated();
        self.persist(&record)?;
        info!(product = %self.slug, key = %mask_key(&key), "license deactivated locally");

        outcome.map(|_| record)
    }

    /// Re-checks the stored key and folds the verdict into the record.
    ///
    /// Returns `None` without a remote call when no key is stored. A failed
    /// check of any kind, transport included, marks the record deactivated
    /// with `expiry_days = 0` and keeps the key.
    pub fn refresh_status(&self) -> LicenseResult<Option<LicenseRecord>> {
        let Some(mut record) = self.keyed_license()? else {
            debug!(product = %self.slug, "no license key stored, skipping refresh");
            return Ok(None);
        };

        match self.check(&record.key).and_then(RemoteVerdict::into_result) {
            Ok(terms) => {
                record.apply_terms(terms);
                info!(product = %self.slug, "license refresh confirmed activation");
            }
            Err(e) => {
                record.revoke();
                info!(product = %self.slug, "license refresh revoked activation: {e}");
            }
        }

        self.persist(&record)?;
        Ok(Some(record))
    }

    /// True iff the stored record has a key and is activated.
    ///
    /// Computed once per reconciler; only this reconciler's own writes reset it.
    pub fn is_valid(&self) -> bool {
        if let Some(valid) = self.valid.get() {
            return valid;
        }

        let valid = match self.license() {
            Ok(record) => record.is_some_and(|r| r.is_active()),
            Err(e) => {
                warn!(product = %self.slug, "could not read license record: {e}");
                return false;
            }
        };
        debug!(product = %self.slug, valid, "computed license validity");
        self.valid.set(Some(valid));
        valid
    }

    /// Same precondition as [`is_valid`](Self::is_valid), plus stored
    /// `attribute` equal to `value`. Never errors; reads the store each time.
    pub fn is_valid_by(&self, attribute: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        match self.license() {
            Ok(Some(record)) if record.is_active() => record.attribute(attribute) == Some(value),
            Ok(_) => false,
            Err(e) => {
                warn!(product = %self.slug, "could not read license record: {e}");
                false
            }
        }
    }

    /// Handles a license form submission.
    ///
    /// Every failure except a broken store becomes an unsuccessful
    /// [`FormResponse`] carrying a human-readable message.
    pub fn submit_form(
        &self,
        request: &FormRequest,
        guard: &dyn AuthGuard,
    ) -> LicenseResult<FormResponse> {
        let result = guard
            .authorize(request.nonce.as_deref())
            .and_then(|()| self.dispatch(request));

        let license = self.license()?;
        match result {
            Ok(message) => Ok(FormResponse {
                success: true,
                message: message.to_string(),
                license,
            }),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => Ok(FormResponse {
                success: false,
                message: e.to_string(),
                license,
            }),
        }
    }

    fn dispatch(&self, request: &FormRequest) -> LicenseResult<&'static str> {
        match request.action {
            FormAction::Activate => {
                self.activate(request.license_key.as_deref().unwrap_or(""))?;
                Ok(MSG_ACTIVATED)
            }
            FormAction::Deactivate => {
                self.deactivate()?;
                Ok(MSG_DEACTIVATED)
            }
            FormAction::Refresh => match self.refresh_status()? {
                Some(_) => Ok(MSG_REFRESHED),
                None => Err(LicenseError::NotFound(MSG_KEY_NOT_FOUND.to_string())),
            },
        }
    }

    /// Schedules the recurring refresh plus a one-shot shortly after `now`.
    ///
    /// Returns `false` and changes nothing if the hook is already scheduled.
    pub fn schedule_refresh(
        &self,
        scheduler: &dyn Scheduler,
        now: DateTime<Utc>,
    ) -> LicenseResult<bool> {
        if scheduler.is_scheduled(&self.hook)? {
            return Ok(false);
        }
        let interval = self.schedule.interval()?;
        let first_check = chrono::TimeDelta::from_std(self.schedule.initial_delay())
            .ok()
            .and_then(|delay| now.checked_add_signed(delay))
            .ok_or_else(|| {
                LicenseError::Config(format!(
                    "schedule.initial_delay_secs {} is out of range",
                    self.schedule.initial_delay_secs
                ))
            })?;

        scheduler.schedule(&self.hook, ScheduledEvent::recurring(now, interval))?;
        scheduler.schedule(&self.hook, ScheduledEvent::once(first_check))?;
        info!(product = %self.slug, hook = %self.hook, "license refresh scheduled");
        Ok(true)
    }

    /// Cancels every scheduled refresh for this product.
    pub fn clear_schedule(&self, scheduler: &dyn Scheduler) -> LicenseResult<()> {
        scheduler.clear(&self.hook)?;
        info!(product = %self.slug, hook = %self.hook, "license refresh unscheduled");
        Ok(())
    }

    /// Fires due hooks at `now` and refreshes if this product's hook was
    /// among them. Due hooks of other products are consumed too.
    pub fn run_due(&self, scheduler: &dyn Scheduler, now: DateTime<Utc>) -> LicenseResult<Tick> {
        let due = scheduler.take_due(now)?;
        if !due.iter().any(|hook| hook == &self.hook) {
            return Ok(Tick::NotDue);
        }
        Ok(match self.refresh_status()? {
            Some(record) => Tick::Refreshed(record),
            None => Tick::NoKey,
        })
    }
}
