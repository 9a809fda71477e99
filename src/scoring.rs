//! XP calculator.
//!
//! Pure and stateless per call: everything it needs arrives as arguments, and
//! the result exposes a per-source breakdown for auditing, not just a total.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::catalog::MissionCatalog;
use crate::config::EngineConfig;
use crate::report::{PrayerMode, Submission};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct XpBreakdown {
    pub missions: u32,
    pub perfect_day: u32,
    pub prayers: u32,
    pub scripture: u32,
    pub sunnah_boost: u32,
    pub memorization: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyXp {
    pub total: u32,
    pub perfect_day_bonus: u32,
    pub breakdown: XpBreakdown,
}

/// Score one day's effective selection.
pub fn score(
    effective: &BTreeSet<String>,
    submission: &Submission,
    catalog: &MissionCatalog,
    config: &EngineConfig,
) -> DailyXp {
    let mut breakdown = XpBreakdown::default();

    for code in effective {
        if code == &config.scripture_code {
            // One point per verse read, taken from the sub-report. The
            // catalog base value does not apply to this code.
            breakdown.scripture = breakdown.scripture.saturating_add(
                submission
                    .sub_reports
                    .scripture
                    .as_ref()
                    .map(|s| s.total_ayat_read)
                    .unwrap_or(0),
            );
        } else if config.visit_codes.contains(code) {
            breakdown.missions += config.visit_points;
        } else if code == &config.reflection_code {
            breakdown.missions += config.reflection_points;
        } else if let Some(mission) = catalog.get(code) {
            breakdown.missions += mission.base_points;
        }
    }

    // All-or-nothing conjunction: fasting plus every pillar present.
    let all_pillars = config
        .pillar_codes
        .iter()
        .all(|code| effective.contains(code));
    if submission.fasting && all_pillars {
        breakdown.perfect_day = config.perfect_day_bonus;
    }

    for mode in submission.prayer_log.entries().into_iter().flatten() {
        breakdown.prayers += match mode {
            PrayerMode::Congregation => config.congregation_points,
            PrayerMode::Individual => config.individual_points,
        };
    }

    breakdown.sunnah_boost = submission
        .sunnah_boost
        .clamp(0, i64::from(config.sunnah_boost_cap)) as u32;

    breakdown.memorization = submission.memorization_bonus.min(config.memorization_cap);

    DailyXp {
        total: breakdown
            .missions
            .saturating_add(breakdown.perfect_day)
            .saturating_add(breakdown.prayers)
            .saturating_add(breakdown.scripture)
            .saturating_add(breakdown.sunnah_boost)
            .saturating_add(breakdown.memorization),
        perfect_day_bonus: breakdown.perfect_day,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::codes;
    use crate::report::{PrayerLog, ScriptureReading, SubReports};

    fn setup() -> (MissionCatalog, EngineConfig) {
        (MissionCatalog::default_catalog(), EngineConfig::default())
    }

    fn effective(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn base_points_come_from_the_catalog() {
        let (catalog, config) = setup();
        let xp = score(
            &effective(&[codes::PRAYER_5X, codes::SAHUR]),
            &Submission::default(),
            &catalog,
            &config,
        );
        assert_eq!(xp.breakdown.missions, 30); // 25 + 5
        assert_eq!(xp.total, 30);
    }

    #[test]
    fn scripture_scores_one_point_per_verse() {
        let (catalog, config) = setup();
        let submission = Submission {
            sub_reports: SubReports {
                scripture: Some(ScriptureReading {
                    start_ayat: 1,
                    end_ayat: 45,
                    total_ayat_read: 45,
                }),
                ..SubReports::default()
            },
            ..Submission::default()
        };
        let xp = score(
            &effective(&[codes::QURAN_READING]),
            &submission,
            &catalog,
            &config,
        );
        assert_eq!(xp.breakdown.scripture, 45);
        assert_eq!(xp.breakdown.missions, 0);
        assert_eq!(xp.total, 45);
    }

    #[test]
    fn scripture_code_without_sub_report_scores_zero() {
        let (catalog, config) = setup();
        let xp = score(
            &effective(&[codes::QURAN_READING]),
            &Submission::default(),
            &catalog,
            &config,
        );
        assert_eq!(xp.total, 0);
    }

    #[test]
    fn visit_and_its_alias_score_the_flat_value() {
        let (catalog, config) = setup();
        let xp = score(
            &effective(&[codes::VISIT, codes::VISIT_EID]),
            &Submission::default(),
            &catalog,
            &config,
        );
        assert_eq!(xp.breakdown.missions, 2 * config.visit_points);
    }

    #[test]
    fn perfect_day_needs_fasting_and_every_pillar() {
        let (catalog, config) = setup();
        let pillars = [codes::PRAYER_5X, codes::TARAWIH, codes::QURAN_READING];
        let fasting = Submission {
            fasting: true,
            ..Submission::default()
        };

        let xp = score(&effective(&pillars), &fasting, &catalog, &config);
        assert_eq!(xp.perfect_day_bonus, config.perfect_day_bonus);

        // Dropping any single pillar removes the whole bonus.
        for missing in &pillars {
            let partial: Vec<&str> = pillars.iter().copied().filter(|c| c != missing).collect();
            let xp = score(&effective(&partial), &fasting, &catalog, &config);
            assert_eq!(xp.perfect_day_bonus, 0, "bonus survived without {missing}");
        }

        // Not fasting: no bonus even with all pillars.
        let xp = score(
            &effective(&pillars),
            &Submission::default(),
            &catalog,
            &config,
        );
        assert_eq!(xp.perfect_day_bonus, 0);
    }

    #[test]
    fn prayer_log_scores_per_mode() {
        let (catalog, config) = setup();
        let submission = Submission {
            prayer_log: PrayerLog {
                fajr: Some(PrayerMode::Congregation),
                dhuhr: Some(PrayerMode::Individual),
                asr: None,
                maghrib: Some(PrayerMode::Congregation),
                isha: Some(PrayerMode::Congregation),
            },
            ..Submission::default()
        };
        let xp = score(&BTreeSet::new(), &submission, &catalog, &config);
        assert_eq!(xp.breakdown.prayers, 3 + 1 + 3 + 3);
    }

    #[test]
    fn sunnah_boost_is_clamped_to_range() {
        let (catalog, config) = setup();
        for (input, expected) in [(-20_i64, 0_u32), (0, 0), (40, 40), (100, 100), (250, 100)] {
            let submission = Submission {
                sunnah_boost: input,
                ..Submission::default()
            };
            let xp = score(&BTreeSet::new(), &submission, &catalog, &config);
            assert_eq!(xp.breakdown.sunnah_boost, expected);
        }
    }

    #[test]
    fn memorization_bonus_is_capped() {
        let (catalog, config) = setup();
        let submission = Submission {
            memorization_bonus: 500,
            ..Submission::default()
        };
        let xp = score(&BTreeSet::new(), &submission, &catalog, &config);
        assert_eq!(xp.breakdown.memorization, config.memorization_cap);
    }

    #[test]
    fn extreme_verse_count_saturates_instead_of_wrapping() {
        // Inputs past the validation cap must not wrap the sum.
        let (catalog, config) = setup();
        let submission = Submission {
            sub_reports: SubReports {
                scripture: Some(ScriptureReading {
                    start_ayat: 1,
                    end_ayat: 1,
                    total_ayat_read: u32::MAX,
                }),
                ..SubReports::default()
            },
            sunnah_boost: 1,
            ..Submission::default()
        };
        let xp = score(
            &effective(&[codes::QURAN_READING]),
            &submission,
            &catalog,
            &config,
        );
        assert_eq!(xp.total, u32::MAX);
    }

    #[test]
    fn breakdown_sums_to_total() {
        let (catalog, config) = setup();
        let submission = Submission {
            selected_codes: Vec::new(),
            fasting: true,
            sub_reports: SubReports {
                scripture: Some(ScriptureReading {
                    start_ayat: 1,
                    end_ayat: 20,
                    total_ayat_read: 20,
                }),
                ..SubReports::default()
            },
            prayer_log: PrayerLog {
                fajr: Some(PrayerMode::Congregation),
                ..PrayerLog::default()
            },
            sunnah_boost: 10,
            memorization_bonus: 5,
        };
        let xp = score(
            &effective(&[
                codes::PRAYER_5X,
                codes::TARAWIH,
                codes::QURAN_READING,
                codes::VISIT,
            ]),
            &submission,
            &catalog,
            &config,
        );
        let b = xp.breakdown;
        assert_eq!(
            xp.total,
            b.missions + b.perfect_day + b.prayers + b.scripture + b.sunnah_boost + b.memorization
        );
        assert_eq!(b.missions, 25 + 20 + 10); // pillars minus scripture, plus flat visit
        assert_eq!(b.perfect_day, 50);
    }
}
