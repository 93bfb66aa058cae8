//! Recurring refresh trigger
//!
//! The host owns the clock; this module only records which hooks should fire
//! when. A [`Scheduler`] is the host's "run this roughly daily" facility, and
//! [`ScheduleTable`] is the bookkeeping shared by the in-memory and on-disk
//! implementations.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LicenseError, LicenseResult};

/// Hook under which a product's refresh is scheduled.
pub fn hook_name(slug: &str) -> String {
    format!("{slug}_license_check_event")
}

/// A single pending run, optionally repeating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub next_run: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
}

impl ScheduledEvent {
    pub fn once(at: DateTime<Utc>) -> Self {
        Self {
            next_run: at,
            interval_secs: None,
        }
    }

    pub fn recurring(first_run: DateTime<Utc>, every: Duration) -> Self {
        Self {
            next_run: first_run,
            interval_secs: Some(every.as_secs().max(1)),
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_run <= now
    }
}

/// Pending events per hook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTable {
    #[serde(default)]
    pub hooks: BTreeMap<String, Vec<ScheduledEvent>>,
}

impl ScheduleTable {
    pub fn is_scheduled(&self, hook: &str) -> bool {
        self.hooks.get(hook).is_some_and(|events| !events.is_empty())
    }

    pub fn add(&mut self, hook: &str, event: ScheduledEvent) {
        self.hooks.entry(hook.to_string()).or_default().push(event);
    }

    pub fn clear(&mut self, hook: &str) {
        self.hooks.remove(hook);
    }

    /// Earliest pending run for `hook`.
    pub fn next_run(&self, hook: &str) -> Option<DateTime<Utc>> {
        self.hooks.get(hook)?.iter().map(|e| e.next_run).min()
    }

    /// Returns each hook with at least one due event, once.
    ///
    /// Fired one-shot events are dropped; recurring events move to their
    /// first slot after `now` (missed slots are not replayed). A recurring
    /// event whose next slot cannot be represented is an error and leaves
    /// the table unchanged.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> LicenseResult<Vec<String>> {
        let mut next = self.clone();
        let mut due = Vec::new();

        for (hook, events) in next.hooks.iter_mut() {
            let mut fired = false;
            let mut kept = Vec::with_capacity(events.len());
            for mut event in events.drain(..) {
                if !event.is_due(now) {
                    kept.push(event);
                    continue;
                }
                fired = true;
                if let Some(secs) = event.interval_secs {
                    event.next_run = next_slot(event.next_run, secs, now).ok_or_else(|| {
                        LicenseError::Config(format!(
                            "cannot advance {hook} by {secs}s past {now}"
                        ))
                    })?;
                    kept.push(event);
                }
            }
            *events = kept;
            if fired {
                due.push(hook.clone());
            }
        }

        next.hooks.retain(|_, events| !events.is_empty());
        *self = next;
        Ok(due)
    }
}

/// First slot after `now` on the grid `from + k * secs`.
fn next_slot(from: DateTime<Utc>, secs: u64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(secs.max(1)).ok()?;
    let behind = (now - from).num_seconds();
    let step = (behind / secs).checked_add(1)?.checked_mul(secs)?;
    from.checked_add_signed(TimeDelta::try_seconds(step)?)
}

/// Host facility that fires hooks on a cadence
pub trait Scheduler {
    fn is_scheduled(&self, hook: &str) -> LicenseResult<bool>;

    fn schedule(&self, hook: &str, event: ScheduledEvent) -> LicenseResult<()>;

    /// Cancels every pending event for `hook`.
    fn clear(&self, hook: &str) -> LicenseResult<()>;

    /// Hooks due at `now`; advances the schedule past them.
    fn take_due(&self, now: DateTime<Utc>) -> LicenseResult<Vec<String>>;
}

/// Scheduler that lives for the process only
#[derive(Debug, Default)]
pub struct MemoryScheduler {
    table: RwLock<ScheduleTable>,
}

impl MemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current table.
    pub fn snapshot(&self) -> ScheduleTable {
        self.table.read().map(|t| t.clone()).unwrap_or_default()
    }
}

fn poisoned(e: impl std::fmt::Display) -> LicenseError {
    LicenseError::Storage(format!("lock poisoned: {e}"))
}

impl Scheduler for MemoryScheduler {
    fn is_scheduled(&self, hook: &str) -> LicenseResult<bool> {
        Ok(self.table.read().map_err(poisoned)?.is_scheduled(hook))
    }

    fn schedule(&self, hook: &str, event: ScheduledEvent) -> LicenseResult<()> {
        self.table.write().map_err(poisoned)?.add(hook, event);
        Ok(())
    }

    fn clear(&self, hook: &str) -> LicenseResult<()> {
        self.table.write().map_err(poisoned)?.clear(hook);
        Ok(())
    }

    fn take_due(&self, now: DateTime<Utc>) -> LicenseResult<Vec<String>> {
        self.table.write().map_err(poisoned)?.take_due(now)
    }
}
