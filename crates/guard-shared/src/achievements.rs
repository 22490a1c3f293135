//! Achievement badges earned from training history.
//!
//! Computed from [`ProgressStats`] on demand; nothing here is persisted, so
//! resetting the progress log also resets the badges.

use crate::stats::ProgressStats;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

impl Achievement {
    const fn new(
        id: &'static str,
        icon: &'static str,
        name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            icon,
            name,
            description,
            unlocked: false,
        }
    }
}

pub fn all_achievements() -> Vec<Achievement> {
    vec![
        // Milestones
        Achievement::new("first_session", "[1]", "First Steps", "Complete your first training session"),
        Achievement::new("ten_sessions", "[10]", "Dedicated", "Complete 10 training sessions"),
        Achievement::new("fifty_sessions", "[50]", "Committed", "Complete 50 training sessions"),
        Achievement::new("hundred_sessions", "[100]", "Veteran", "Complete 100 training sessions"),
        // Volume
        Achievement::new("hundred_punches", "<100>", "Heavy Hands", "Throw 100 punches"),
        Achievement::new("thousand_punches", "<1k>", "Iron Fists", "Throw 1000 punches"),
        Achievement::new("hour_trained", "|60m|", "Hour of Power", "Train for an hour in total"),
        // Quality
        Achievement::new("solid_stance", "(90+)", "Rock Solid", "Reach 90% average stance accuracy"),
    ]
}

/// Every achievement, with `unlocked` set from `stats`
pub fn check_achievements(stats: &ProgressStats) -> Vec<Achievement> {
    let mut achievements = all_achievements();
    for ach in &mut achievements {
        ach.unlocked = is_unlocked(ach.id, stats);
    }
    achievements
}

pub fn unlocked_achievements(stats: &ProgressStats) -> Vec<Achievement> {
    check_achievements(stats)
        .into_iter()
        .filter(|a| a.unlocked)
        .collect()
}

/// Achievements unlocked going from `before` to `after`
pub fn newly_unlocked(before: &ProgressStats, after: &ProgressStats) -> Vec<Achievement> {
    let already: Vec<_> = unlocked_achievements(before).iter().map(|a| a.id).collect();
    unlocked_achievements(after)
        .into_iter()
        .filter(|a| !already.contains(&a.id))
        .collect()
}

fn is_unlocked(id: &str, stats: &ProgressStats) -> bool {
    match id {
        "first_session" => stats.sessions >= 1,
        "ten_sessions" => stats.sessions >= 10,
        "fifty_sessions" => stats.sessions >= 50,
        "hundred_sessions" => stats.sessions >= 100,
        "hundred_punches" => stats.total_punches >= 100,
        "thousand_punches" => stats.total_punches >= 1_000,
        "hour_trained" => stats.total_training_ms >= 60 * 60 * 1_000,
        "solid_stance" => stats.sessions > 0 && stats.accuracy.stance >= 90.0,
        _ => false,
    }
}
