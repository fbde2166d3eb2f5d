//! Static achievement catalog.
//!
//! Fixed at build time and never mutated at runtime. Ids are unique and
//! stable; they are the keys persisted in the earned map, so renaming one
//! orphans every unlock recorded under the old id.

use crate::daily::DailyExtras;
use crate::stats::StatsSnapshot;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Unlock condition evaluated against the latest snapshot and the optional
/// daily-challenge extras. Total by construction; missing extras never
/// satisfy a streak rule.
pub type Predicate = fn(&StatsSnapshot, Option<&DailyExtras>) -> bool;

/// One immutable catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Emoji shown on the unlock toast and the achievements page.
    pub icon: &'static str,
    pub predicate: Predicate,
}

fn first_session(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.global.total_sessions >= 1
}

fn sessions_10(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.global.total_sessions >= 10
}

fn sessions_50(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.global.total_sessions >= 50
}

fn sessions_250(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.global.total_sessions >= 250
}

fn distinct_3(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.distinct_games() >= 3
}

fn distinct_6(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.distinct_games() >= 6
}

fn first_completion(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.total_completions() >= 1
}

fn completions_25(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.total_completions() >= 25
}

fn play_time_1h(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.global.total_time_ms >= 60 * 60 * 1000
}

fn play_time_10h(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats.global.total_time_ms >= 10 * 60 * 60 * 1000
}

fn best_score_at_least(stats: &StatsSnapshot, slug: &str, score: i64) -> bool {
    stats.game(slug).is_some_and(|game| game.best_score >= score)
}

fn snake_30(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    best_score_at_least(stats, "snake", 30)
}

fn breakout_5000(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    best_score_at_least(stats, "breakout", 5_000)
}

fn memory_1000(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    best_score_at_least(stats, "memory", 1_000)
}

fn breakout_level_10(stats: &StatsSnapshot, _: Option<&DailyExtras>) -> bool {
    stats
        .game("breakout")
        .is_some_and(|game| game.levels_completed >= 10)
}

fn streak_3(_: &StatsSnapshot, extras: Option<&DailyExtras>) -> bool {
    extras.is_some_and(|daily| daily.streak >= 3)
}

fn streak_7(_: &StatsSnapshot, extras: Option<&DailyExtras>) -> bool {
    extras.is_some_and(|daily| daily.streak >= 7)
}

fn streak_30(_: &StatsSnapshot, extras: Option<&DailyExtras>) -> bool {
    extras.is_some_and(|daily| daily.streak >= 30)
}

fn daily_10(_: &StatsSnapshot, extras: Option<&DailyExtras>) -> bool {
    extras.is_some_and(|daily| daily.completed_days >= 10)
}

/// The full catalog, evaluated in this order.
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first-steps",
        title: "First Steps",
        description: "Play your first game",
        icon: "🎮",
        predicate: first_session,
    },
    AchievementDef {
        id: "regular",
        title: "Regular",
        description: "Play 10 sessions",
        icon: "🕹️",
        predicate: sessions_10,
    },
    AchievementDef {
        id: "devoted",
        title: "Devoted",
        description: "Play 50 sessions",
        icon: "🎯",
        predicate: sessions_50,
    },
    AchievementDef {
        id: "arcade-legend",
        title: "Arcade Legend",
        description: "Play 250 sessions",
        icon: "👑",
        predicate: sessions_250,
    },
    AchievementDef {
        id: "explorer",
        title: "Explorer",
        description: "Try 3 different games",
        icon: "🧭",
        predicate: distinct_3,
    },
    AchievementDef {
        id: "collector",
        title: "Collector",
        description: "Try 6 different games",
        icon: "🗺️",
        predicate: distinct_6,
    },
    AchievementDef {
        id: "finisher",
        title: "Finisher",
        description: "Complete a game for the first time",
        icon: "🏁",
        predicate: first_completion,
    },
    AchievementDef {
        id: "closer",
        title: "Closer",
        description: "Complete 25 games",
        icon: "✅",
        predicate: completions_25,
    },
    AchievementDef {
        id: "hour-power",
        title: "Hour of Power",
        description: "Play for a total of one hour",
        icon: "⏰",
        predicate: play_time_1h,
    },
    AchievementDef {
        id: "marathoner",
        title: "Marathoner",
        description: "Play for a total of ten hours",
        icon: "🏃",
        predicate: play_time_10h,
    },
    AchievementDef {
        id: "snake-charmer",
        title: "Snake Charmer",
        description: "Score 30 in Snake",
        icon: "🐍",
        predicate: snake_30,
    },
    AchievementDef {
        id: "wall-breaker",
        title: "Wall Breaker",
        description: "Score 5,000 in Breakout",
        icon: "🧱",
        predicate: breakout_5000,
    },
    AchievementDef {
        id: "total-recall",
        title: "Total Recall",
        description: "Score 1,000 in Memory",
        icon: "🧠",
        predicate: memory_1000,
    },
    AchievementDef {
        id: "deep-run",
        title: "Deep Run",
        description: "Reach level 10 in Breakout",
        icon: "🚀",
        predicate: breakout_level_10,
    },
    AchievementDef {
        id: "streak-starter",
        title: "Streak Starter",
        description: "Complete the daily challenge 3 days in a row",
        icon: "🔥",
        predicate: streak_3,
    },
    AchievementDef {
        id: "streak-week",
        title: "Full Week",
        description: "Complete the daily challenge 7 days in a row",
        icon: "📅",
        predicate: streak_7,
    },
    AchievementDef {
        id: "streak-month",
        title: "Iron Month",
        description: "Complete the daily challenge 30 days in a row",
        icon: "🏆",
        predicate: streak_30,
    },
    AchievementDef {
        id: "daily-devotee",
        title: "Daily Devotee",
        description: "Complete 10 daily challenges",
        icon: "🌅",
        predicate: daily_10,
    },
];

/// Look up a catalog entry by id.
#[must_use]
pub fn achievement_by_id(id: &str) -> Option<&'static AchievementDef> {
    static BY_ID: Lazy<HashMap<&'static str, &'static AchievementDef>> =
        Lazy::new(|| ACHIEVEMENTS.iter().map(|def| (def.id, def)).collect());
    BY_ID.get(id).copied()
}
