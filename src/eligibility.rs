//! Eligibility gate.
//!
//! Runs strictly before scoring, on every submission. Gated-out codes are not
//! errors; they are dropped from the effective set and reported back as
//! advisories so the web layer can tell the user why.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::catalog::MissionCatalog;
use crate::config::EngineConfig;
use crate::hijri;
use crate::report::{DailyReport, Submission};

#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct GateOutcome {
    pub effective: BTreeSet<String>,
    pub rejections: Vec<Rejection>,
}

fn festival_window_open(today: NaiveDate, config: &EngineConfig) -> bool {
    if config.festival_dates.is_empty() {
        hijri::is_festival_day(today)
    } else {
        config.festival_dates.contains(&today)
    }
}

fn claimed_on_another_date(code: &str, other_reports: &[DailyReport]) -> bool {
    other_reports
        .iter()
        .any(|r| r.effective_codes.contains(code))
}

/// Filter the submission's selected codes down to the effective set.
///
/// `other_reports` is the user's history excluding the report date being
/// submitted, so that resubmitting a day never blocks against itself. The
/// one-time rule is re-evaluated every time: a code claimed on another date
/// since the original submission is dropped even on a legitimate resubmit.
pub fn gate(
    today: NaiveDate,
    submission: &Submission,
    other_reports: &[DailyReport],
    catalog: &MissionCatalog,
    config: &EngineConfig,
) -> GateOutcome {
    let mut selected: BTreeSet<String> = submission.selected_codes.iter().cloned().collect();

    // Fixed sub-report -> code link: a valid short talk scores its mission
    // even when the UI omitted the checkbox.
    if submission.sub_reports.has_valid_short_talk() {
        selected.insert(config.short_talk_code.clone());
    }

    let mut effective = BTreeSet::new();
    let mut rejections = Vec::new();

    for code in selected {
        if !catalog.is_active(&code) {
            rejections.push(Rejection {
                reason: "not an active mission".to_string(),
                code,
            });
            continue;
        }

        if code == config.festival_code && !festival_window_open(today, config) {
            rejections.push(Rejection {
                reason: "only active on festival day".to_string(),
                code,
            });
            continue;
        }

        if config.one_time_codes.contains(&code) && claimed_on_another_date(&code, other_reports) {
            rejections.push(Rejection {
                reason: "can only be counted once".to_string(),
                code,
            });
            continue;
        }

        effective.insert(code);
    }

    for rejection in &rejections {
        debug!(code = %rejection.code, reason = %rejection.reason, "selection gated out");
    }

    GateOutcome {
        effective,
        rejections,
    }
}
