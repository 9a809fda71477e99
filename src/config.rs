//! Engine configuration.
//!
//! All fixed codes, point values and caps live in one injected struct so the
//! gate, the calculator and the catalog check never reach for ambient state.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::env;

use crate::error::EngineError;

/// Stable catalog codes the engine wires special behavior to.
pub mod codes {
    pub const PRAYER_5X: &str = "PRAYER_5X";
    pub const TARAWIH: &str = "TARAWIH";
    pub const QURAN_READING: &str = "QURAN_READING";
    pub const REFLECTION: &str = "REFLECTION";
    pub const VISIT: &str = "VISIT";
    pub const VISIT_EID: &str = "VISIT_EID";
    pub const FESTIVAL: &str = "FESTIVAL";
    pub const CHARITY: &str = "CHARITY";
    pub const SHORT_TALK: &str = "SHORT_TALK";
    pub const SAHUR: &str = "SAHUR";
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The three primary pillars of the perfect-day conjunction.
    pub pillar_codes: Vec<String>,
    /// Codes honorable at most once across a user's entire history.
    pub one_time_codes: BTreeSet<String>,
    /// The seasonal festival-prayer code.
    pub festival_code: String,
    /// Explicit festival window. Empty means derive from the lunar calendar.
    pub festival_dates: Vec<NaiveDate>,
    /// Codes scored with the flat visit value instead of their catalog value.
    pub visit_codes: BTreeSet<String>,
    pub reflection_code: String,
    pub scripture_code: String,
    pub short_talk_code: String,
    /// Reporting timezone as a fixed UTC offset. Reports are keyed by the
    /// calendar date in this timezone, and it anchors "today" for gating and
    /// the streak walk.
    pub utc_offset_hours: i32,
    pub visit_points: u32,
    pub reflection_points: u32,
    pub perfect_day_bonus: u32,
    pub congregation_points: u32,
    pub individual_points: u32,
    pub sunnah_boost_cap: u32,
    pub memorization_cap: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            pillar_codes: vec![
                codes::PRAYER_5X.to_string(),
                codes::TARAWIH.to_string(),
                codes::QURAN_READING.to_string(),
            ],
            one_time_codes: [codes::FESTIVAL.to_string(), codes::CHARITY.to_string()]
                .into_iter()
                .collect(),
            festival_code: codes::FESTIVAL.to_string(),
            festival_dates: Vec::new(),
            visit_codes: [codes::VISIT.to_string(), codes::VISIT_EID.to_string()]
                .into_iter()
                .collect(),
            reflection_code: codes::REFLECTION.to_string(),
            scripture_code: codes::QURAN_READING.to_string(),
            short_talk_code: codes::SHORT_TALK.to_string(),
            utc_offset_hours: 0,
            visit_points: 10,
            reflection_points: 10,
            perfect_day_bonus: 50,
            congregation_points: 3,
            individual_points: 1,
            sunnah_boost_cap: 100,
            memorization_cap: 30,
        }
    }
}

impl EngineConfig {
    /// Default configuration with overrides from `RAMADAN_FESTIVAL_DATES`
    /// (comma-separated `YYYY-MM-DD` list) and `RAMADAN_UTC_OFFSET_HOURS`.
    /// Env parsing happens only here, once, at startup, and a malformed
    /// override fails loudly instead of silently falling back to defaults.
    pub fn from_env() -> Result<Self, EngineError> {
        let mut config = EngineConfig::default();

        if let Ok(raw) = env::var("RAMADAN_FESTIVAL_DATES") {
            let mut dates = Vec::new();
            for entry in raw.split(',') {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                let date = entry.parse::<NaiveDate>().map_err(|_| {
                    EngineError::Configuration(format!(
                        "invalid date '{entry}' in RAMADAN_FESTIVAL_DATES"
                    ))
                })?;
                dates.push(date);
            }
            config.festival_dates = dates;
        }

        if let Ok(raw) = env::var("RAMADAN_UTC_OFFSET_HOURS") {
            let hours = raw.trim().parse::<i32>().map_err(|_| {
                EngineError::Configuration(format!(
                    "invalid offset '{raw}' in RAMADAN_UTC_OFFSET_HOURS"
                ))
            })?;
            if !(-12..=14).contains(&hours) {
                return Err(EngineError::Configuration(format!(
                    "RAMADAN_UTC_OFFSET_HOURS {hours} is outside -12..=14"
                )));
            }
            config.utc_offset_hours = hours;
        }

        Ok(config)
    }

    /// Today's calendar date in the reporting timezone.
    pub fn local_today(&self, now: DateTime<Utc>) -> NaiveDate {
        match FixedOffset::east_opt(self.utc_offset_hours * 3600) {
            Some(offset) => now.with_timezone(&offset).date_naive(),
            None => now.date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pillars_are_the_three_primary_codes() {
        let config = EngineConfig::default();
        assert_eq!(config.pillar_codes.len(), 3);
        assert!(config.pillar_codes.contains(&codes::PRAYER_5X.to_string()));
        assert!(config.pillar_codes.contains(&codes::TARAWIH.to_string()));
        assert!(config
            .pillar_codes
            .contains(&codes::QURAN_READING.to_string()));
    }

    #[test]
    fn festival_and_charity_are_one_time() {
        let config = EngineConfig::default();
        assert!(config.one_time_codes.contains(codes::FESTIVAL));
        assert!(config.one_time_codes.contains(codes::CHARITY));
    }

    // Single test for all env overrides: they share process-global state.
    #[test]
    fn env_overrides_parse_or_fail_loudly() {
        env::set_var("RAMADAN_FESTIVAL_DATES", "2025-03-30, 2025-03-31");
        env::remove_var("RAMADAN_UTC_OFFSET_HOURS");
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.festival_dates.len(), 2);

        env::set_var("RAMADAN_FESTIVAL_DATES", "2025-03-30, not-a-date");
        assert!(matches!(
            EngineConfig::from_env(),
            Err(EngineError::Configuration(_))
        ));
        env::remove_var("RAMADAN_FESTIVAL_DATES");

        env::set_var("RAMADAN_UTC_OFFSET_HOURS", "7");
        let config = EngineConfig::from_env().unwrap();
        assert_eq!(config.utc_offset_hours, 7);

        env::set_var("RAMADAN_UTC_OFFSET_HOURS", "25");
        assert!(EngineConfig::from_env().is_err());
        env::set_var("RAMADAN_UTC_OFFSET_HOURS", "banana");
        assert!(EngineConfig::from_env().is_err());
        env::remove_var("RAMADAN_UTC_OFFSET_HOURS");
    }

    #[test]
    fn local_today_respects_the_reporting_offset() {
        use chrono::TimeZone;

        let mut config = EngineConfig::default();
        config.utc_offset_hours = 7; // western Indonesia
        let evening_utc = Utc.with_ymd_and_hms(2025, 3, 10, 18, 30, 0).unwrap();
        assert_eq!(
            config.local_today(evening_utc),
            NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()
        );

        config.utc_offset_hours = 0;
        assert_eq!(
            config.local_today(evening_utc),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
    }
}
