//! Tests for the schedule table and in-memory scheduler

use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use licenser_core::schedule::hook_name;
use licenser_core::{LicenseError, MemoryScheduler, ScheduleTable, ScheduledEvent, Scheduler};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[test]
fn one_shot_fires_once() {
    let mut table = ScheduleTable::default();
    table.add("h", ScheduledEvent::once(t0() + TimeDelta::seconds(20)));

    assert!(table.take_due(t0()).unwrap().is_empty());
    assert_eq!(table.take_due(t0() + TimeDelta::seconds(20)).unwrap(), vec!["h"]);
    assert!(!table.is_scheduled("h"));
    assert!(table.take_due(t0() + TimeDelta::days(1)).unwrap().is_empty());
}

#[test]
fn recurring_advances_past_now() {
    let mut table = ScheduleTable::default();
    table.add("h", ScheduledEvent::recurring(t0(), DAY));

    assert_eq!(table.take_due(t0()).unwrap(), vec!["h"]);
    assert_eq!(table.next_run("h"), Some(t0() + TimeDelta::days(1)));

    // Three missed days collapse into one run.
    let late = t0() + TimeDelta::days(4) + TimeDelta::hours(3);
    assert_eq!(table.take_due(late).unwrap(), vec!["h"]);
    assert_eq!(table.next_run("h"), Some(t0() + TimeDelta::days(5)));
    assert!(table.is_scheduled("h"));
}

#[test]
fn hook_reported_once_when_several_events_due() {
    let mut table = ScheduleTable::default();
    table.add("h", ScheduledEvent::recurring(t0(), DAY));
    table.add("h", ScheduledEvent::once(t0() + TimeDelta::seconds(20)));

    assert_eq!(table.take_due(t0() + TimeDelta::minutes(1)).unwrap(), vec!["h"]);
    assert_eq!(table.hooks["h"].len(), 1);
}

#[test]
fn clear_removes_all_events() {
    let mut table = ScheduleTable::default();
    table.add("a", ScheduledEvent::recurring(t0(), DAY));
    table.add("b", ScheduledEvent::once(t0()));
    table.clear("a");

    assert!(!table.is_scheduled("a"));
    assert!(table.is_scheduled("b"));
    assert_eq!(table.take_due(t0()).unwrap(), vec!["b"]);
}

#[test]
fn unrepresentable_next_slot_is_an_error() {
    let mut table = ScheduleTable::default();
    table.add(
        "h",
        ScheduledEvent {
            next_run: t0(),
            interval_secs: Some(u64::MAX),
        },
    );
    table.add("h", ScheduledEvent::once(t0()));
    let before = table.clone();

    assert!(matches!(
        table.take_due(t0()),
        Err(LicenseError::Config(_))
    ));
    assert_eq!(table, before);

    let mut table = ScheduleTable::default();
    table.add("h", ScheduledEvent::recurring(DateTime::<Utc>::MAX_UTC, DAY));
    assert!(table.take_due(DateTime::<Utc>::MAX_UTC).is_err());
    assert!(table.is_scheduled("h"));
}

#[test]
fn table_serde_roundtrip() {
    let mut table = ScheduleTable::default();
    table.add("h", ScheduledEvent::recurring(t0(), DAY));
    table.add("h", ScheduledEvent::once(t0()));

    let json = serde_json::to_string(&table).unwrap();
    let back: ScheduleTable = serde_json::from_str(&json).unwrap();
    assert_eq!(back, table);
}

#[test]
fn memory_scheduler_implements_trait() {
    let scheduler = MemoryScheduler::new();
    let hook = hook_name("acme-forms");
    assert!(!scheduler.is_scheduled(&hook).unwrap());

    scheduler
        .schedule(&hook, ScheduledEvent::once(t0()))
        .unwrap();
    assert!(scheduler.is_scheduled(&hook).unwrap());
    assert_eq!(scheduler.take_due(t0()).unwrap(), vec![hook.clone()]);
    assert!(!scheduler.is_scheduled(&hook).unwrap());

    scheduler
        .schedule(&hook, ScheduledEvent::recurring(t0(), DAY))
        .unwrap();
    scheduler.clear(&hook).unwrap();
    assert!(scheduler.snapshot().hooks.is_empty());
}
