//! Aggregate-stats snapshot assembly for the badge deriver.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::report::DailyReport;
use crate::store::UserRecord;

/// Ranking inputs the caller assembles from whatever leaderboard queries it
/// already performs. A zero population means "no ranking available".
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RankContext {
    #[serde(default)]
    pub school_rank: u32,
    #[serde(default)]
    pub school_size: u32,
    #[serde(default)]
    pub class_rank: u32,
    #[serde(default)]
    pub class_size: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatsSnapshot {
    pub total_xp: u32,
    pub current_streak: u32,
    pub total_reports: u32,
    pub fasting_days: u32,
    /// Days with a written reflection.
    pub narrated_days: u32,
    /// Days that earned the perfect-day bonus.
    pub perfect_days: u32,
    /// Distinct activity codes ever completed.
    pub distinct_codes: u32,
    pub school_rank: u32,
    pub school_size: u32,
    pub class_rank: u32,
    pub class_size: u32,
}

pub fn build_snapshot(
    record: &UserRecord,
    reports: &[DailyReport],
    ranks: RankContext,
) -> StatsSnapshot {
    let fasting_days = reports.iter().filter(|r| r.fasting).count() as u32;
    let narrated_days = reports
        .iter()
        .filter(|r| {
            r.sub_reports
                .reflection
                .as_ref()
                .map(|x| !x.text.trim().is_empty())
                .unwrap_or(false)
        })
        .count() as u32;
    let perfect_days = reports.iter().filter(|r| r.perfect_day_bonus > 0).count() as u32;
    let distinct_codes = reports
        .iter()
        .flat_map(|r| r.effective_codes.iter())
        .collect::<BTreeSet<_>>()
        .len() as u32;

    StatsSnapshot {
        total_xp: record.total_xp,
        current_streak: record.current_streak,
        total_reports: reports.len() as u32,
        fasting_days,
        narrated_days,
        perfect_days,
        distinct_codes,
        school_rank: ranks.school_rank,
        school_size: ranks.school_size,
        class_rank: ranks.class_rank,
        class_size: ranks.class_size,
    }
}
