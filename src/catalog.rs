//! Mission (activity) catalog.
//!
//! Read-only to the engine; an external management surface maintains it. The
//! engine only requires that every fixed code its configuration references
//! exists and is active, checked once at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{codes, EngineConfig};
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionCategory {
    Obligatory,
    Sunnah,
    Social,
    Seasonal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    /// Stable identifier, independent of the display title.
    pub code: String,
    pub title: String,
    pub category: MissionCategory,
    pub base_points: u32,
    pub requires_narration: bool,
    pub active: bool,
}

impl Mission {
    fn new(
        code: &str,
        title: &str,
        category: MissionCategory,
        base_points: u32,
        requires_narration: bool,
    ) -> Self {
        Mission {
            code: code.to_string(),
            title: title.to_string(),
            category,
            base_points,
            requires_narration,
            active: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MissionCatalog {
    missions: HashMap<String, Mission>,
}

impl MissionCatalog {
    pub fn new(missions: Vec<Mission>) -> Self {
        MissionCatalog {
            missions: missions.into_iter().map(|m| (m.code.clone(), m)).collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Mission> {
        self.missions.get(code)
    }

    pub fn is_active(&self, code: &str) -> bool {
        self.missions.get(code).map(|m| m.active).unwrap_or(false)
    }

    pub fn active_missions(&self) -> impl Iterator<Item = &Mission> {
        self.missions.values().filter(|m| m.active)
    }

    /// Fails loudly when a fixed code the configuration relies on is missing
    /// or inactive, instead of silently scoring zero at submission time.
    pub fn validate(&self, config: &EngineConfig) -> Result<(), EngineError> {
        let mut required: Vec<&str> = config.pillar_codes.iter().map(String::as_str).collect();
        required.push(&config.festival_code);
        required.push(&config.reflection_code);
        required.push(&config.scripture_code);
        required.push(&config.short_talk_code);
        required.extend(config.visit_codes.iter().map(String::as_str));
        required.extend(config.one_time_codes.iter().map(String::as_str));

        for code in required {
            if !self.is_active(code) {
                return Err(EngineError::Configuration(format!(
                    "fixed code {code} is missing or inactive in the catalog"
                )));
            }
        }
        Ok(())
    }

    /// The seeded school catalog.
    pub fn default_catalog() -> Self {
        MissionCatalog::new(vec![
            Mission::new(
                codes::PRAYER_5X,
                "Five daily prayers",
                MissionCategory::Obligatory,
                25,
                false,
            ),
            Mission::new(
                codes::TARAWIH,
                "Tarawih prayer",
                MissionCategory::Sunnah,
                20,
                false,
            ),
            Mission::new(
                codes::QURAN_READING,
                "Quran reading (tadarus)",
                MissionCategory::Sunnah,
                10,
                false,
            ),
            Mission::new(
                codes::REFLECTION,
                "Daily reflection",
                MissionCategory::Sunnah,
                5,
                true,
            ),
            Mission::new(
                codes::SHORT_TALK,
                "Short talk (kultum) summary",
                MissionCategory::Sunnah,
                15,
                false,
            ),
            Mission::new(codes::SAHUR, "Pre-dawn meal", MissionCategory::Sunnah, 5, false),
            Mission::new(
                codes::VISIT,
                "Family visit (silaturahmi)",
                MissionCategory::Social,
                10,
                false,
            ),
            Mission::new(
                codes::VISIT_EID,
                "Eid visit",
                MissionCategory::Seasonal,
                10,
                false,
            ),
            Mission::new(
                codes::FESTIVAL,
                "Eid prayer",
                MissionCategory::Seasonal,
                40,
                false,
            ),
            Mission::new(
                codes::CHARITY,
                "Zakat fitrah",
                MissionCategory::Seasonal,
                30,
                false,
            ),
        ])
    }
}
