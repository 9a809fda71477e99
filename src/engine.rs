//! The daily progress engine: one submission is validate -> gate -> score ->
//! upsert -> recompute, synchronously. Aggregates are always re-derived from
//! the full history so corrections and backfills self-heal.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::badges::{self, BadgeView};
use crate::catalog::MissionCatalog;
use crate::config::EngineConfig;
use crate::eligibility::{self, Rejection};
use crate::error::{EngineError, StoreError};
use crate::report::{DailyReport, Submission};
use crate::scoring::{self, XpBreakdown};
use crate::stats::{self, RankContext};
use crate::store::{Aggregates, ReportStore};

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub xp_gained: u32,
    pub perfect_day_bonus: u32,
    pub breakdown: XpBreakdown,
    pub rejections: Vec<Rejection>,
    pub total_xp: u32,
    pub current_streak: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct UserProgress {
    pub total_xp: u32,
    pub current_streak: u32,
    pub level: u32,
}

pub struct ProgressEngine<S: ReportStore> {
    store: S,
    catalog: MissionCatalog,
    config: EngineConfig,
}

impl<S: ReportStore> ProgressEngine<S> {
    /// Fails with [`EngineError::Configuration`] when the catalog is missing
    /// a fixed code, so a broken deployment dies at startup instead of
    /// silently scoring zero.
    pub fn new(store: S, catalog: MissionCatalog, config: EngineConfig) -> Result<Self, EngineError> {
        catalog.validate(&config)?;
        Ok(ProgressEngine {
            store,
            catalog,
            config,
        })
    }

    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    /// Today's calendar date in the configured reporting timezone.
    pub fn local_today(&self) -> NaiveDate {
        self.config.local_today(Utc::now())
    }

    /// Submit (or resubmit) the report for (user, date). `today` anchors both
    /// the festival window and the streak walk, and must be the calendar date
    /// in the user's reporting timezone (see [`ProgressEngine::local_today`]).
    pub fn submit_daily_report(
        &self,
        user_id: &str,
        date: NaiveDate,
        today: NaiveDate,
        mut submission: Submission,
        display_name: Option<&str>,
    ) -> Result<SubmissionOutcome, EngineError> {
        submission.validate(&self.catalog)?;

        self.store.ensure_user(user_id, display_name)?;
        let snapshot = self.store.history(user_id)?;

        let existing = snapshot.reports.iter().find(|r| r.date == date);
        // Prayers reported earlier today are kept, not re-scored from scratch.
        if let Some(previous) = existing {
            submission.prayer_log.merge_missing_from(&previous.prayer_log);
        }

        // The report being resubmitted must not block its own one-time codes.
        let other_reports: Vec<DailyReport> = snapshot
            .reports
            .iter()
            .filter(|r| r.date != date)
            .cloned()
            .collect();

        let gate = eligibility::gate(today, &submission, &other_reports, &self.catalog, &self.config);
        let xp = scoring::score(&gate.effective, &submission, &self.catalog, &self.config);

        let now = Utc::now();
        let mut selected_at = existing.map(|r| r.selected_at.clone()).unwrap_or_default();
        selected_at.retain(|code, _| gate.effective.contains(code));
        for code in &gate.effective {
            selected_at.entry(code.clone()).or_insert(now);
        }

        self.store.upsert_report(DailyReport {
            user_id: user_id.to_string(),
            date,
            effective_codes: gate.effective,
            fasting: submission.fasting,
            sub_reports: submission.sub_reports.clone(),
            prayer_log: submission.prayer_log,
            selected_at,
            xp_gained: xp.total,
            perfect_day_bonus: xp.perfect_day_bonus,
        })?;

        let (total_xp, current_streak) = self.recompute(user_id, today)?;

        info!(
            user_id,
            %date,
            xp_gained = xp.total,
            total_xp,
            current_streak,
            rejections = gate.rejections.len(),
            "daily report scored"
        );

        Ok(SubmissionOutcome {
            xp_gained: xp.total,
            perfect_day_bonus: xp.perfect_day_bonus,
            breakdown: xp.breakdown,
            rejections: gate.rejections,
            total_xp,
            current_streak,
        })
    }

    /// Re-derive lifetime XP and the streak from the complete history and
    /// persist both atomically onto the user record. The only path that
    /// writes the cached aggregates.
    fn recompute(&self, user_id: &str, today: NaiveDate) -> Result<(u32, u32), EngineError> {
        let snapshot = self.store.history(user_id)?;
        let total_xp = snapshot.reports.iter().map(|r| r.xp_gained).sum();
        let current_streak = streak(&snapshot.reports, today);
        let last_report_date = snapshot.reports.iter().map(|r| r.date).max();

        self.store
            .write_aggregates(
                user_id,
                Aggregates {
                    total_xp,
                    current_streak,
                    last_report_date,
                },
                snapshot.version,
            )
            .map_err(|err| match err {
                StoreError::StaleSnapshot { user_id, .. } => EngineError::Conflict { user_id },
            })?;

        Ok((total_xp, current_streak))
    }

    pub fn user_progress(&self, user_id: &str) -> Result<UserProgress, EngineError> {
        let record = self.store.user(user_id)?;
        let (total_xp, current_streak) = record
            .map(|r| (r.total_xp, r.current_streak))
            .unwrap_or((0, 0));
        Ok(UserProgress {
            total_xp,
            current_streak,
            level: total_xp / 100 + 1,
        })
    }

    pub fn badges(&self, user_id: &str, ranks: RankContext) -> Result<Vec<BadgeView>, EngineError> {
        let snapshot = self.store.history(user_id)?;
        let record = self.store.user(user_id)?;
        let stats = match record {
            Some(record) => stats::build_snapshot(&record, &snapshot.reports, ranks),
            None => Default::default(),
        };
        Ok(badges::derive_badges(&stats))
    }
}

/// Count consecutive fasting days ending at or before `today`, walking the
/// date-descending history with a day-by-day cursor. A missing day or a
/// non-fasting report ends the streak; reports later than the cursor are
/// out-of-order artifacts and are skipped without counting.
fn streak(reports_desc: &[DailyReport], today: NaiveDate) -> u32 {
    let mut cursor = today;
    let mut count = 0;
    for report in reports_desc {
        if report.date > cursor {
            continue;
        }
        if report.date < cursor {
            break;
        }
        if !report.fasting {
            break;
        }
        count += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SubReports;
    use std::collections::{BTreeMap, BTreeSet};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn report(day: u32, fasting: bool) -> DailyReport {
        DailyReport {
            user_id: "u1".to_string(),
            date: date(day),
            effective_codes: BTreeSet::new(),
            fasting,
            sub_reports: SubReports::default(),
            prayer_log: Default::default(),
            selected_at: BTreeMap::new(),
            xp_gained: 0,
            perfect_day_bonus: 0,
        }
    }

    #[test]
    fn streak_counts_consecutive_fasting_days() {
        let reports = vec![report(10, true), report(9, true), report(8, true)];
        assert_eq!(streak(&reports, date(10)), 3);
    }

    #[test]
    fn streak_stops_at_a_gap() {
        // D, D-1, D-3: the missing D-2 caps the streak at 2.
        let reports = vec![report(10, true), report(9, true), report(7, true)];
        assert_eq!(streak(&reports, date(10)), 2);
    }

    #[test]
    fn streak_stops_at_a_non_fasting_day() {
        let reports = vec![report(10, true), report(9, false), report(8, true)];
        assert_eq!(streak(&reports, date(10)), 1);
    }

    #[test]
    fn streak_is_zero_without_a_report_today() {
        let reports = vec![report(8, true), report(7, true)];
        assert_eq!(streak(&reports, date(10)), 0);
    }

    #[test]
    fn out_of_order_later_dates_are_skipped() {
        // A report dated after `today` must not count or break the walk.
        let reports = vec![report(12, true), report(10, true), report(9, true)];
        assert_eq!(streak(&reports, date(10)), 2);
    }

    #[test]
    fn empty_history_has_no_streak() {
        assert_eq!(streak(&[], date(10)), 0);
    }
}
