//! Badge deriver.
//!
//! Badge definitions are static configuration, never persisted; the full set
//! is recomputed from a stats snapshot on every query. Each definition maps
//! the snapshot to a current value against a fixed target. The completionist
//! badge counts the other unlocked badges, so it is evaluated last.

use serde::Serialize;

use crate::stats::StatsSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BadgeMetric {
    Reports,
    Streak,
    FastingDays,
    TotalXp,
    NarratedDays,
    PerfectDays,
    DistinctCodes,
    ClassPodium,
    SchoolElite,
    Completionist,
}

struct BadgeDef {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    target: u32,
    metric: BadgeMetric,
}

const BADGES: &[BadgeDef] = &[
    BadgeDef {
        id: "first_step",
        title: "First Step",
        description: "Submit your first daily report",
        target: 1,
        metric: BadgeMetric::Reports,
    },
    BadgeDef {
        id: "week_streak",
        title: "Weekly Warrior",
        description: "Keep a 7-day fasting streak",
        target: 7,
        metric: BadgeMetric::Streak,
    },
    BadgeDef {
        id: "full_month",
        title: "Full Month",
        description: "Fast on 30 reported days",
        target: 30,
        metric: BadgeMetric::FastingDays,
    },
    BadgeDef {
        id: "xp_500",
        title: "Point Master",
        description: "Earn 500 lifetime XP",
        target: 500,
        metric: BadgeMetric::TotalXp,
    },
    BadgeDef {
        id: "storyteller",
        title: "Storyteller",
        description: "Write a reflection on 10 days",
        target: 10,
        metric: BadgeMetric::NarratedDays,
    },
    BadgeDef {
        id: "flawless",
        title: "Flawless",
        description: "Earn the perfect-day bonus 10 times",
        target: 10,
        metric: BadgeMetric::PerfectDays,
    },
    BadgeDef {
        id: "explorer",
        title: "Explorer",
        description: "Complete 10 different missions",
        target: 10,
        metric: BadgeMetric::DistinctCodes,
    },
    BadgeDef {
        id: "class_podium",
        title: "Class Podium",
        description: "Reach the top 3 of your class",
        target: 1,
        metric: BadgeMetric::ClassPodium,
    },
    BadgeDef {
        id: "school_elite",
        title: "School Elite",
        description: "Reach the top 10 of the school",
        target: 1,
        metric: BadgeMetric::SchoolElite,
    },
    BadgeDef {
        id: "completionist",
        title: "Completionist",
        description: "Unlock every other badge",
        target: (BADGES_BEFORE_COMPLETIONIST) as u32,
        metric: BadgeMetric::Completionist,
    },
];

const BADGES_BEFORE_COMPLETIONIST: usize = 9;

#[derive(Debug, Clone, Serialize)]
pub struct BadgeView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub current: u32,
    pub target: u32,
    /// 0..=100.
    pub progress: u32,
    pub unlocked: bool,
}

fn metric_value(metric: BadgeMetric, snapshot: &StatsSnapshot, unlocked_so_far: u32) -> u32 {
    match metric {
        BadgeMetric::Reports => snapshot.total_reports,
        BadgeMetric::Streak => snapshot.current_streak,
        BadgeMetric::FastingDays => snapshot.fasting_days,
        BadgeMetric::TotalXp => snapshot.total_xp,
        BadgeMetric::NarratedDays => snapshot.narrated_days,
        BadgeMetric::PerfectDays => snapshot.perfect_days,
        BadgeMetric::DistinctCodes => snapshot.distinct_codes,
        BadgeMetric::ClassPodium => {
            let ranked = snapshot.class_size > 0 && snapshot.class_rank >= 1;
            (ranked && snapshot.class_rank <= 3) as u32
        }
        BadgeMetric::SchoolElite => {
            let ranked = snapshot.school_size > 0 && snapshot.school_rank >= 1;
            (ranked && snapshot.school_rank <= 10) as u32
        }
        BadgeMetric::Completionist => unlocked_so_far,
    }
}

fn progress_pct(current: u32, target: u32) -> u32 {
    if target == 0 {
        return 100;
    }
    ((f64::from(current) / f64::from(target)).clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Derive the full badge list from a snapshot.
pub fn derive_badges(snapshot: &StatsSnapshot) -> Vec<BadgeView> {
    let mut views = Vec::with_capacity(BADGES.len());
    let mut unlocked_count = 0u32;

    for def in BADGES
        .iter()
        .filter(|d| d.metric != BadgeMetric::Completionist)
    {
        let current = metric_value(def.metric, snapshot, 0);
        let progress = progress_pct(current, def.target);
        let unlocked = progress >= 100;
        if unlocked {
            unlocked_count += 1;
        }
        views.push(BadgeView {
            id: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            current,
            target: def.target,
            progress,
            unlocked,
        });
    }

    for def in BADGES
        .iter()
        .filter(|d| d.metric == BadgeMetric::Completionist)
    {
        let current = metric_value(def.metric, snapshot, unlocked_count);
        let progress = progress_pct(current, def.target);
        views.push(BadgeView {
            id: def.id.to_string(),
            title: def.title.to_string(),
            description: def.description.to_string(),
            current,
            target: def.target,
            progress,
            unlocked: progress >= 100,
        });
    }

    views
}
