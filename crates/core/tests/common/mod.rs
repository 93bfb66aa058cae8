//! Shared test helpers: a scripted remote client and a ready-made config.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use licenser_core::{
    LicenseError, LicenseReconciler, LicenseResult, LicenserConfig, MemoryStore, RawResponse,
    RemoteClient, RequestPayload,
};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum Reply {
    Body(String),
    Down(String),
}

/// Remote client that replays scripted replies and records every call.
///
/// Scripted replies are used in order; after that the fallback (if any)
/// answers every call.
#[derive(Debug, Default)]
pub struct FakeClient {
    queue: RefCell<VecDeque<Reply>>,
    fallback: Option<Reply>,
    calls: RefCell<Vec<(String, RequestPayload)>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every call with `body`.
    pub fn always(body: impl Into<String>) -> Self {
        Self {
            fallback: Some(Reply::Body(body.into())),
            ..Self::default()
        }
    }

    /// Fails every call at the transport level.
    pub fn unreachable() -> Self {
        Self {
            fallback: Some(Reply::Down("connection refused".to_string())),
            ..Self::default()
        }
    }

    pub fn then(self, body: impl Into<String>) -> Self {
        self.queue.borrow_mut().push_back(Reply::Body(body.into()));
        self
    }

    pub fn then_down(self) -> Self {
        self.queue
            .borrow_mut()
            .push_back(Reply::Down("connection reset".to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(String, RequestPayload)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn routes(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|(r, _)| r.clone()).collect()
    }
}

impl RemoteClient for FakeClient {
    fn send(&self, payload: &RequestPayload, route: &str) -> LicenseResult<RawResponse> {
        self.calls
            .borrow_mut()
            .push((route.to_string(), payload.clone()));
        let reply = self
            .queue
            .borrow_mut()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| Reply::Down("no scripted reply".to_string()));
        match reply {
            Reply::Body(body) => Ok(RawResponse::ok(body)),
            Reply::Down(reason) => Err(LicenseError::Transport(reason)),
        }
    }
}

pub fn test_config() -> LicenserConfig {
    LicenserConfig::from_toml(
        r#"
[product]
name = "Acme Forms"
slug = "acme-forms"
hash = "f3a9c1"
version = "2.1.0"

[remote]
api_url = "https://licensing.example.com/"

[site]
url = "https://shop.example.com"
"#,
    )
    .unwrap()
}

pub fn reconciler(client: FakeClient) -> LicenseReconciler<FakeClient, MemoryStore> {
    LicenseReconciler::new(&test_config(), client, MemoryStore::new())
}

/// A second request scope over the same store contents.
pub fn reopen(
    prev: &LicenseReconciler<FakeClient, MemoryStore>,
    client: FakeClient,
) -> LicenseReconciler<FakeClient, MemoryStore> {
    let store = MemoryStore::new();
    if let Some(record) = prev.license().unwrap() {
        licenser_core::LicenseStore::set(&store, prev.store_key(), &record).unwrap();
    }
    LicenseReconciler::new(&test_config(), client, store)
}

pub const GRANTED: &str = r#"{"success":true,"remaining":3,"activation_count":2,"activation_limit":5,"expiry_days":10,"expiry_date":"2025-01-01","title":"Pro"}"#;

pub const DENIED: &str = r#"{"success":false}"#;

pub fn denied_with(error: &str) -> String {
    serde_json::json!({ "success": false, "error": error }).to_string()
}
