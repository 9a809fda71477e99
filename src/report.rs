//! Daily report model: the raw submission, its structured sub-reports and the
//! stored per-day record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::MissionCatalog;
use crate::error::EngineError;

/// Verse count of the whole Quran; no daily reading can exceed it.
const QURAN_TOTAL_AYAT: u32 = 6236;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrayerMode {
    Congregation,
    Individual,
}

/// Per-prayer attendance log for the five daily prayers. A slot left at
/// `None` contributes no points. The log persists across resubmissions within
/// a day; the submission path fills empty slots from the stored report rather
/// than overwriting prayers reported earlier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerLog {
    pub fajr: Option<PrayerMode>,
    pub dhuhr: Option<PrayerMode>,
    pub asr: Option<PrayerMode>,
    pub maghrib: Option<PrayerMode>,
    pub isha: Option<PrayerMode>,
}

impl PrayerLog {
    pub fn entries(&self) -> [Option<PrayerMode>; 5] {
        [self.fajr, self.dhuhr, self.asr, self.maghrib, self.isha]
    }

    /// Fill empty slots from an earlier log for the same day.
    pub fn merge_missing_from(&mut self, earlier: &PrayerLog) {
        self.fajr = self.fajr.or(earlier.fajr);
        self.dhuhr = self.dhuhr.or(earlier.dhuhr);
        self.asr = self.asr.or(earlier.asr);
        self.maghrib = self.maghrib.or(earlier.maghrib);
        self.isha = self.isha.or(earlier.isha);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptureReading {
    pub start_ayat: u32,
    pub end_ayat: u32,
    pub total_ayat_read: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FestivalPrayer {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charity {
    pub beneficiary: String,
    pub form: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub host: String,
    pub photo_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortTalk {
    pub video_ref: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubReports {
    pub scripture: Option<ScriptureReading>,
    pub reflection: Option<Reflection>,
    pub festival: Option<FestivalPrayer>,
    pub charity: Option<Charity>,
    pub visit: Option<Visit>,
    pub short_talk: Option<ShortTalk>,
}

impl SubReports {
    /// A short-talk sub-report only links its catalog code when both fields
    /// carry content.
    pub fn has_valid_short_talk(&self) -> bool {
        self.short_talk
            .as_ref()
            .map(|t| !t.video_ref.trim().is_empty() && !t.summary.trim().is_empty())
            .unwrap_or(false)
    }
}

/// One user's raw daily submission, as forwarded by the web layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub selected_codes: Vec<String>,
    #[serde(default)]
    pub fasting: bool,
    #[serde(default)]
    pub sub_reports: SubReports,
    #[serde(default)]
    pub prayer_log: PrayerLog,
    /// Self-reported extra sunnah points, clamped to the configured cap.
    #[serde(default)]
    pub sunnah_boost: i64,
    /// Externally tracked memorization contribution, accepted verbatim up to
    /// the configured cap.
    #[serde(default)]
    pub memorization_bonus: u32,
}

impl Submission {
    /// Shape validation, run before gating. A failure here persists nothing.
    pub fn validate(&self, catalog: &MissionCatalog) -> Result<(), EngineError> {
        if let Some(scripture) = &self.sub_reports.scripture {
            if scripture.end_ayat < scripture.start_ayat {
                return Err(EngineError::Validation(
                    "scripture range ends before it starts".to_string(),
                ));
            }
            if scripture.total_ayat_read == 0 {
                return Err(EngineError::Validation(
                    "scripture report has no verses read".to_string(),
                ));
            }
            if scripture.total_ayat_read > QURAN_TOTAL_AYAT {
                return Err(EngineError::Validation(format!(
                    "scripture report claims more than {QURAN_TOTAL_AYAT} verses"
                )));
            }
        }

        if let Some(talk) = &self.sub_reports.short_talk {
            if talk.video_ref.trim().is_empty() || talk.summary.trim().is_empty() {
                return Err(EngineError::Validation(
                    "short talk report requires a video reference and a summary".to_string(),
                ));
            }
        }

        let narration = self
            .sub_reports
            .reflection
            .as_ref()
            .map(|r| !r.text.trim().is_empty())
            .unwrap_or(false);
        for code in &self.selected_codes {
            if let Some(mission) = catalog.get(code) {
                if mission.requires_narration && !narration {
                    return Err(EngineError::Validation(format!(
                        "mission {code} requires a written narration"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Stored record for one (user, calendar date). At most one exists per key;
/// resubmission overwrites it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub user_id: String,
    pub date: NaiveDate,
    /// Codes that survived eligibility gating for this date.
    pub effective_codes: BTreeSet<String>,
    pub fasting: bool,
    pub sub_reports: SubReports,
    pub prayer_log: PrayerLog,
    /// When each effective code was first selected. Retained codes keep their
    /// original timestamp across resubmissions.
    pub selected_at: BTreeMap<String, DateTime<Utc>>,
    pub xp_gained: u32,
    pub perfect_day_bonus: u32,
}

/// HTTP body for the submission endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    pub user_id: String,
    pub date: NaiveDate,
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub submission: Submission,
}
