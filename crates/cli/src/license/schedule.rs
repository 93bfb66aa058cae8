//! On-disk refresh schedule, driven by `licenser tick`

use chrono::{DateTime, Utc};
use licenser_core::{LicenseResult, ScheduleTable, ScheduledEvent, Scheduler};
use std::path::{Path, PathBuf};

pub const SCHEDULE_FILENAME: &str = "schedule.json";

/// `ScheduleTable` persisted as JSON; every call loads and saves the file.
pub struct FileScheduler {
    path: PathBuf,
}

impl FileScheduler {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(SCHEDULE_FILENAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> LicenseResult<ScheduleTable> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ScheduleTable::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, table: &ScheduleTable) -> LicenseResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(table)?)?;
        Ok(())
    }

    /// Saves only when `f` succeeds.
    fn update<T>(
        &self,
        f: impl FnOnce(&mut ScheduleTable) -> LicenseResult<T>,
    ) -> LicenseResult<T> {
        let mut table = self.load()?;
        let out = f(&mut table)?;
        self.save(&table)?;
        Ok(out)
    }
}

impl Scheduler for FileScheduler {
    fn is_scheduled(&self, hook: &str) -> LicenseResult<bool> {
        Ok(self.load()?.is_scheduled(hook))
    }

    fn schedule(&self, hook: &str, event: ScheduledEvent) -> LicenseResult<()> {
        self.update(|t| {
            t.add(hook, event);
            Ok(())
        })
    }

    fn clear(&self, hook: &str) -> LicenseResult<()> {
        self.update(|t| {
            t.clear(hook);
            Ok(())
        })
    }

    fn take_due(&self, now: DateTime<Utc>) -> LicenseResult<Vec<String>> {
        self.update(|t| t.take_due(now))
    }
}
