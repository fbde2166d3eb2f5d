//! Durable aggregation of per-game and global play statistics.

use crate::event::GameEvent;
use crate::storage::{read_doc, write_doc};
use crate::sync::StoreSync;
use crate::{ProgressStore, STATS_KEY};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Aggregated statistics for one game. All fields move monotonically:
/// best score is a max, sessions and time are sums, records never shrink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    #[serde(default)]
    pub sessions: u64,
    #[serde(default)]
    pub time_played_ms: u64,
    #[serde(default)]
    pub best_score: i64,
    #[serde(default)]
    pub completions: u64,
    /// Highest level ever completed, for level-based games.
    #[serde(default)]
    pub levels_completed: u32,
    #[serde(default)]
    pub last_played_ms: u64,
}

/// Catalog-wide aggregate across all games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub total_time_ms: u64,
    #[serde(default)]
    pub games_played: BTreeSet<String>,
}

/// Point-in-time view of all aggregated statistics. The sole input to
/// achievement predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub games: BTreeMap<String, GameStats>,
    #[serde(default)]
    pub global: GlobalStats,
}

impl StatsSnapshot {
    /// Stats for one game, if it was ever played.
    #[must_use]
    pub fn game(&self, slug: &str) -> Option<&GameStats> {
        self.games.get(slug)
    }

    /// Number of distinct games ever played.
    #[must_use]
    pub fn distinct_games(&self) -> usize {
        self.global.games_played.len()
    }

    /// Total completions across the catalog.
    #[must_use]
    pub fn total_completions(&self) -> u64 {
        self.games.values().map(|game| game.completions).sum()
    }

    fn apply_end(
        &mut self,
        slug: &str,
        score: i64,
        completed: bool,
        duration_ms: u64,
        ended_ms: u64,
    ) {
        let game = self.games.entry(slug.to_string()).or_default();
        game.sessions = game.sessions.saturating_add(1);
        game.time_played_ms = game.time_played_ms.saturating_add(duration_ms);
        game.best_score = game.best_score.max(score);
        if completed {
            game.completions = game.completions.saturating_add(1);
        }
        game.last_played_ms = game.last_played_ms.max(ended_ms);

        self.global.total_sessions = self.global.total_sessions.saturating_add(1);
        self.global.total_time_ms = self.global.total_time_ms.saturating_add(duration_ms);
        self.global.games_played.insert(slug.to_string());
    }

    fn apply_level(&mut self, slug: &str, level: u32) {
        let game = self.games.entry(slug.to_string()).or_default();
        game.levels_completed = game.levels_completed.max(level);
    }
}

/// Durable stats aggregator; owns the stats document and its update signal.
pub struct StatsStore<S: ProgressStore> {
    store: Rc<S>,
    sync: Rc<StoreSync<StatsSnapshot>>,
    /// Slug → session start time. In-memory only; a reload mid-game loses
    /// the window and that session contributes zero play time.
    open_sessions: RefCell<BTreeMap<String, u64>>,
}

impl<S: ProgressStore + 'static> StatsStore<S> {
    #[must_use]
    pub fn new(store: Rc<S>) -> Self {
        let reader = Rc::clone(&store);
        let sync = Rc::new(StoreSync::new(
            move || read_doc::<StatsSnapshot, _>(reader.as_ref(), STATS_KEY),
            StatsSnapshot::default(),
        ));
        Self {
            store,
            sync,
            open_sessions: RefCell::new(BTreeMap::new()),
        }
    }

    /// Update signal and snapshot cache for this store.
    #[must_use]
    pub fn sync(&self) -> &Rc<StoreSync<StatsSnapshot>> {
        &self.sync
    }

    /// Latest snapshot; the default when storage is absent or corrupt.
    /// Never errors.
    #[must_use]
    pub fn read(&self) -> StatsSnapshot {
        (*self.sync.snapshot()).clone()
    }

    /// Apply one lifecycle event to the aggregates.
    ///
    /// `Start` only opens the timing window for its slug. `End` closes the
    /// window, folds the session into the per-game and global aggregates,
    /// persists the whole snapshot as one document, and fires the update
    /// signal; `LevelComplete` raises the level high-water mark the same
    /// way. Storage failures are swallowed and this tab keeps serving its
    /// in-memory state.
    pub fn ingest(&self, event: &GameEvent) {
        match event {
            GameEvent::Start { slug, timestamp_ms } => {
                self.open_sessions
                    .borrow_mut()
                    .insert(slug.clone(), *timestamp_ms);
            }
            GameEvent::End {
                slug,
                score,
                completed,
                timestamp_ms,
                ..
            } => {
                let started = self.open_sessions.borrow_mut().remove(slug);
                let duration_ms =
                    started.map_or(0, |start_ms| timestamp_ms.saturating_sub(start_ms));
                let mut snapshot = self.read();
                snapshot.apply_end(slug, *score, *completed, duration_ms, *timestamp_ms);
                self.persist(snapshot);
            }
            GameEvent::LevelComplete { slug, level, .. } => {
                let mut snapshot = self.read();
                snapshot.apply_level(slug, *level);
                self.persist(snapshot);
            }
        }
    }

    fn persist(&self, snapshot: StatsSnapshot) {
        write_doc(self.store.as_ref(), STATS_KEY, &snapshot);
        self.sync.publish(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> StatsStore<MemoryStore> {
        StatsStore::new(Rc::new(MemoryStore::new()))
    }

    fn end(slug: &str, score: i64, completed: bool, at_ms: u64) -> GameEvent {
        GameEvent::End {
            slug: slug.to_string(),
            score,
            completed,
            level: None,
            timestamp_ms: at_ms,
        }
    }

    #[test]
    fn lower_score_keeps_best_higher_score_replaces_it() {
        let stats = store();
        stats.ingest(&end("snake", 100, true, 1_000));
        stats.ingest(&end("snake", 80, true, 2_000));
        assert_eq!(stats.read().game("snake").unwrap().best_score, 100);

        stats.ingest(&end("snake", 150, true, 3_000));
        assert_eq!(stats.read().game("snake").unwrap().best_score, 150);
    }

    #[test]
    fn end_event_updates_per_game_and_global_aggregates() {
        let stats = store();
        stats.ingest(&GameEvent::Start {
            slug: "snake".to_string(),
            timestamp_ms: 1_000,
        });
        stats.ingest(&end("snake", 12, true, 61_000));
        stats.ingest(&end("breakout", 40, false, 70_000));

        let snapshot = stats.read();
        let snake = snapshot.game("snake").unwrap();
        assert_eq!(snake.sessions, 1);
        assert_eq!(snake.time_played_ms, 60_000);
        assert_eq!(snake.completions, 1);
        assert_eq!(snake.last_played_ms, 61_000);

        assert_eq!(snapshot.global.total_sessions, 2);
        assert_eq!(snapshot.global.total_time_ms, 60_000);
        assert_eq!(snapshot.distinct_games(), 2);
        assert_eq!(snapshot.total_completions(), 1);
    }

    #[test]
    fn end_without_open_window_contributes_zero_time() {
        let stats = store();
        stats.ingest(&end("memory", 5, false, 9_000));
        let snapshot = stats.read();
        assert_eq!(snapshot.game("memory").unwrap().time_played_ms, 0);
        assert_eq!(snapshot.game("memory").unwrap().sessions, 1);
    }

    #[test]
    fn level_complete_raises_the_high_water_mark_only() {
        let stats = store();
        stats.ingest(&GameEvent::LevelComplete {
            slug: "breakout".to_string(),
            level: 4,
            score: 300,
            timestamp_ms: 1_000,
        });
        stats.ingest(&GameEvent::LevelComplete {
            slug: "breakout".to_string(),
            level: 2,
            score: 900,
            timestamp_ms: 2_000,
        });
        let snapshot = stats.read();
        assert_eq!(snapshot.game("breakout").unwrap().levels_completed, 4);
        // Sessions are only counted on End.
        assert_eq!(snapshot.global.total_sessions, 0);
    }

    #[test]
    fn corrupt_stats_document_reads_as_default() {
        let backing = MemoryStore::new();
        backing.seed_raw(STATS_KEY, "!!! definitely not json !!!");
        let stats = StatsStore::new(Rc::new(backing));
        assert_eq!(stats.read(), StatsSnapshot::default());
    }

    #[test]
    fn corrupt_document_is_replaced_on_next_write() {
        let backing = MemoryStore::new();
        backing.seed_raw(STATS_KEY, "{broken");
        let stats = StatsStore::new(Rc::new(backing.clone()));
        stats.ingest(&end("snake", 3, false, 1_000));

        let reloaded = StatsStore::new(Rc::new(backing));
        assert_eq!(reloaded.read().game("snake").unwrap().best_score, 3);
    }

    #[test]
    fn persisted_snapshot_survives_a_new_store_instance() {
        let backing = MemoryStore::new();
        let stats = StatsStore::new(Rc::new(backing.clone()));
        stats.ingest(&end("snake", 42, true, 5_000));

        let reloaded = StatsStore::new(Rc::new(backing));
        assert_eq!(reloaded.read().game("snake").unwrap().best_score, 42);
    }
}
