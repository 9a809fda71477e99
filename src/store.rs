//! Report store: one report per (user, calendar date), plus the cached
//! aggregates recomputation writes back.
//!
//! The engine treats persistence as upsert-by-key and never merges at this
//! layer. Aggregate writes are guarded by a per-user history version so a
//! recomputation based on a stale snapshot surfaces as a conflict instead of
//! silently overwriting.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::error::StoreError;
use crate::report::DailyReport;

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    pub user_id: String,
    pub display_name: String,
    /// Derived, cached. Written only by recomputation.
    pub total_xp: u32,
    /// Derived, cached. Written only by recomputation.
    pub current_streak: u32,
    /// Derived, cached. Written only by recomputation.
    pub last_report_date: Option<NaiveDate>,
}

/// A consistent read of one user's full history. `version` increments on
/// every report write and anchors the conflict check on the aggregate write.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    /// Date-descending.
    pub reports: Vec<DailyReport>,
    pub version: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct Aggregates {
    pub total_xp: u32,
    pub current_streak: u32,
    pub last_report_date: Option<NaiveDate>,
}

pub trait ReportStore: Send + Sync {
    /// Create the user record if absent; update the display name if given.
    fn ensure_user(&self, user_id: &str, display_name: Option<&str>) -> Result<(), StoreError>;

    /// Insert or overwrite the report for (report.user_id, report.date).
    fn upsert_report(&self, report: DailyReport) -> Result<(), StoreError>;

    fn history(&self, user_id: &str) -> Result<HistorySnapshot, StoreError>;

    /// Write all cached aggregates atomically together. Fails with
    /// [`StoreError::StaleSnapshot`] when the history version moved since the
    /// snapshot the caller recomputed from.
    fn write_aggregates(
        &self,
        user_id: &str,
        aggregates: Aggregates,
        expected_version: u64,
    ) -> Result<(), StoreError>;

    fn user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;
}

#[derive(Debug)]
struct UserState {
    record: UserRecord,
    reports: BTreeMap<NaiveDate, DailyReport>,
    version: u64,
}

/// In-memory store. The single lock serializes writers per process, which
/// also satisfies the engine's per-user write-serialization requirement.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl ReportStore for MemoryStore {
    fn ensure_user(&self, user_id: &str, display_name: Option<&str>) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let state = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserState {
                record: UserRecord {
                    user_id: user_id.to_string(),
                    display_name: user_id.to_string(),
                    total_xp: 0,
                    current_streak: 0,
                    last_report_date: None,
                },
                reports: BTreeMap::new(),
                version: 0,
            });
        if let Some(name) = display_name {
            state.record.display_name = name.to_string();
        }
        Ok(())
    }

    fn upsert_report(&self, report: DailyReport) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let state = users
            .entry(report.user_id.clone())
            .or_insert_with(|| UserState {
                record: UserRecord {
                    user_id: report.user_id.clone(),
                    display_name: report.user_id.clone(),
                    total_xp: 0,
                    current_streak: 0,
                    last_report_date: None,
                },
                reports: BTreeMap::new(),
                version: 0,
            });
        state.reports.insert(report.date, report);
        state.version += 1;
        Ok(())
    }

    fn history(&self, user_id: &str) -> Result<HistorySnapshot, StoreError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        match users.get(user_id) {
            Some(state) => Ok(HistorySnapshot {
                reports: state.reports.values().rev().cloned().collect(),
                version: state.version,
            }),
            None => Ok(HistorySnapshot {
                reports: Vec::new(),
                version: 0,
            }),
        }
    }

    fn write_aggregates(
        &self,
        user_id: &str,
        aggregates: Aggregates,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        let state = match users.get_mut(user_id) {
            Some(state) => state,
            None => return Ok(()), // nothing to update for an unknown user
        };
        if state.version != expected_version {
            return Err(StoreError::StaleSnapshot {
                user_id: user_id.to_string(),
                expected: expected_version,
                found: state.version,
            });
        }
        state.record.total_xp = aggregates.total_xp;
        state.record.current_streak = aggregates.current_streak;
        state.record.last_report_date = aggregates.last_report_date;
        Ok(())
    }

    fn user(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(user_id).map(|s| s.record.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SubReports;
    use std::collections::BTreeSet;

    fn report(user: &str, date: NaiveDate, xp: u32) -> DailyReport {
        DailyReport {
            user_id: user.to_string(),
            date,
            effective_codes: BTreeSet::new(),
            fasting: true,
            sub_reports: SubReports::default(),
            prayer_log: Default::default(),
            selected_at: BTreeMap::new(),
            xp_gained: xp,
            perfect_day_bonus: 0,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn upsert_overwrites_same_day_in_place() {
        let store = MemoryStore::new();
        store.upsert_report(report("u1", date(5), 10)).unwrap();
        store.upsert_report(report("u1", date(5), 99)).unwrap();

        let snapshot = store.history("u1").unwrap();
        assert_eq!(snapshot.reports.len(), 1);
        assert_eq!(snapshot.reports[0].xp_gained, 99);
        assert_eq!(snapshot.version, 2);
    }

    #[test]
    fn history_is_date_descending() {
        let store = MemoryStore::new();
        store.upsert_report(report("u1", date(3), 1)).unwrap();
        store.upsert_report(report("u1", date(7), 2)).unwrap();
        store.upsert_report(report("u1", date(5), 3)).unwrap();

        let dates: Vec<NaiveDate> = store
            .history("u1")
            .unwrap()
            .reports
            .iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(dates, vec![date(7), date(5), date(3)]);
    }

    #[test]
    fn stale_snapshot_is_a_conflict() {
        let store = MemoryStore::new();
        store.upsert_report(report("u1", date(5), 10)).unwrap();
        let snapshot = store.history("u1").unwrap();

        // A second writer lands between the read and the aggregate write.
        store.upsert_report(report("u1", date(6), 20)).unwrap();

        let result = store.write_aggregates(
            "u1",
            Aggregates {
                total_xp: 10,
                current_streak: 1,
                last_report_date: Some(date(5)),
            },
            snapshot.version,
        );
        assert!(matches!(result, Err(StoreError::StaleSnapshot { .. })));
    }

    #[test]
    fn aggregates_are_written_together() {
        let store = MemoryStore::new();
        store.upsert_report(report("u1", date(5), 10)).unwrap();
        let snapshot = store.history("u1").unwrap();
        store
            .write_aggregates(
                "u1",
                Aggregates {
                    total_xp: 10,
                    current_streak: 1,
                    last_report_date: Some(date(5)),
                },
                snapshot.version,
            )
            .unwrap();

        let record = store.user("u1").unwrap().unwrap();
        assert_eq!(record.total_xp, 10);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.last_report_date, Some(date(5)));
    }
}
