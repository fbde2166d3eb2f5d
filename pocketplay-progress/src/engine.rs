//! Composed progress pipeline: ingest → evaluate → merge → enqueue.

use crate::catalog::ACHIEVEMENTS;
use crate::daily::read_daily_extras;
use crate::event::{EventBus, GameEvent, SubscriberId};
use crate::ledger::{EarnedMap, Ledger};
use crate::notify::ToastQueue;
use crate::rules::evaluate;
use crate::stats::{StatsSnapshot, StatsStore};
use crate::sync::StoreSync;
use crate::{Clock, EARNED_KEY, ProgressStore, STATS_KEY};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Main engine binding the event bridge, stats store, rule evaluation,
/// ledger, and toast queue.
///
/// All state is tab-local and single-threaded; within one event the three
/// pipeline steps run strictly sequentially, and cross-tab coherence comes
/// from the storage layer plus the synchronizers' refresh path.
pub struct ProgressEngine<S: ProgressStore + 'static, C: Clock + 'static> {
    bus: Rc<EventBus>,
    stats: Rc<StatsStore<S>>,
    ledger: Rc<Ledger<S>>,
    toasts: Rc<RefCell<ToastQueue>>,
    store: Rc<S>,
    clock: Rc<C>,
    subscription: Cell<Option<SubscriberId>>,
}

impl<S, C> ProgressEngine<S, C>
where
    S: ProgressStore + 'static,
    C: Clock + 'static,
{
    /// Build an engine over the given storage and clock. Call [`init`] to
    /// start reacting to bus events.
    ///
    /// [`init`]: ProgressEngine::init
    #[must_use]
    pub fn new(store: Rc<S>, clock: Rc<C>) -> Self {
        let stats = Rc::new(StatsStore::new(Rc::clone(&store)));
        let ledger = Rc::new(Ledger::new(Rc::clone(&store)));
        Self {
            bus: Rc::new(EventBus::new()),
            stats,
            ledger,
            toasts: Rc::new(RefCell::new(ToastQueue::default())),
            store,
            clock,
            subscription: Cell::new(None),
        }
    }

    /// Wire the pipeline to the event bridge. Calling twice is a no-op.
    pub fn init(&self) {
        if self.subscription.get().is_some() {
            return;
        }
        let stats = Rc::clone(&self.stats);
        let ledger = Rc::clone(&self.ledger);
        let toasts = Rc::clone(&self.toasts);
        let store = Rc::clone(&self.store);
        let clock = Rc::clone(&self.clock);
        let id = self.bus.subscribe(move |event| {
            run_pipeline(
                &stats,
                &ledger,
                &toasts,
                store.as_ref(),
                clock.as_ref(),
                event,
            );
        });
        self.subscription.set(Some(id));
    }

    /// Detach from the event bridge. Already-queued toasts stay queued.
    pub fn dispose(&self) {
        if let Some(id) = self.subscription.take() {
            self.bus.unsubscribe(id);
        }
    }

    /// The bridge games publish into.
    #[must_use]
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    /// Report a session start. Fire-and-forget; never panics back into the
    /// calling game.
    pub fn report_start(&self, slug: &str) {
        self.bus.publish(&GameEvent::Start {
            slug: slug.to_string(),
            timestamp_ms: self.clock.now_ms(),
        });
    }

    /// Report a session end with its final score.
    pub fn report_end(&self, slug: &str, score: i64, completed: bool, level: Option<u32>) {
        self.bus.publish(&GameEvent::End {
            slug: slug.to_string(),
            score,
            completed,
            level,
            timestamp_ms: self.clock.now_ms(),
        });
    }

    /// Report completion of one level within a running session.
    pub fn report_level_complete(&self, slug: &str, level: u32, score: i64) {
        self.bus.publish(&GameEvent::LevelComplete {
            slug: slug.to_string(),
            level,
            score,
            timestamp_ms: self.clock.now_ms(),
        });
    }

    /// Stats view for UI subscribers (same tab and cross-tab refresh).
    #[must_use]
    pub fn stats_sync(&self) -> &Rc<StoreSync<StatsSnapshot>> {
        self.stats.sync()
    }

    /// Earned-map view for UI subscribers.
    #[must_use]
    pub fn earned_sync(&self) -> &Rc<StoreSync<EarnedMap>> {
        self.ledger.sync()
    }

    #[must_use]
    pub fn stats(&self) -> &Rc<StatsStore<S>> {
        &self.stats
    }

    #[must_use]
    pub fn ledger(&self) -> &Rc<Ledger<S>> {
        &self.ledger
    }

    /// Live toast queue for the rendering collaborator.
    #[must_use]
    pub fn toasts(&self) -> &Rc<RefCell<ToastQueue>> {
        &self.toasts
    }

    /// Catalog size, for the "N of M" UI broadcast.
    #[must_use]
    pub fn total(&self) -> usize {
        ACHIEVEMENTS.len()
    }

    /// Number of unlocked achievements.
    #[must_use]
    pub fn earned_count(&self) -> usize {
        self.ledger.earned().len()
    }

    /// Explicit data reset: clears the engine-owned keys and re-publishes
    /// the defaults. The daily-challenge key belongs to its collaborator
    /// and is left alone.
    pub fn reset(&self) {
        for key in [STATS_KEY, EARNED_KEY] {
            if let Err(err) = self.store.remove(key) {
                log::warn!("storage remove failed for {key}: {err}");
            }
        }
        self.stats.sync().publish(StatsSnapshot::default());
        self.ledger.sync().publish(EarnedMap::new());
        self.toasts.borrow_mut().clear();
    }
}

impl<S, C> Drop for ProgressEngine<S, C>
where
    S: ProgressStore + 'static,
    C: Clock + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

fn run_pipeline<S: ProgressStore + 'static, C: Clock>(
    stats: &StatsStore<S>,
    ledger: &Ledger<S>,
    toasts: &RefCell<ToastQueue>,
    store: &S,
    clock: &C,
    event: &GameEvent,
) {
    stats.ingest(event);
    if matches!(event, GameEvent::Start { .. }) {
        // No durable mutation yet, nothing new to evaluate.
        return;
    }
    let snapshot = stats.sync().snapshot();
    let extras = read_daily_extras(store);
    let earned = ledger.earned();
    let newly = evaluate(&snapshot, extras.as_ref(), &earned);
    if newly.is_empty() {
        return;
    }
    let now_ms = clock.now_ms();
    let unlocked = ledger.merge(&newly, now_ms);
    if unlocked.is_empty() {
        return;
    }
    log::debug!(
        "queueing {} unlock toast(s) after {} event",
        unlocked.len(),
        event.slug()
    );
    toasts.borrow_mut().enqueue(&unlocked, now_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;

    fn engine() -> ProgressEngine<MemoryStore, FixedClock> {
        let engine = ProgressEngine::new(
            Rc::new(MemoryStore::new()),
            Rc::new(FixedClock::new(1_000)),
        );
        engine.init();
        engine
    }

    #[test]
    fn end_event_runs_the_full_pipeline() {
        let engine = engine();
        engine.report_start("snake");
        engine.report_end("snake", 12, true, None);

        assert_eq!(engine.stats().read().global.total_sessions, 1);
        // first-steps and finisher both qualify from one completed session.
        assert_eq!(engine.earned_count(), 2);
        assert_eq!(engine.toasts().borrow().len(), 2);
    }

    #[test]
    fn init_is_idempotent_and_dispose_detaches() {
        let engine = engine();
        engine.init();
        assert_eq!(engine.bus().subscriber_count(), 1);

        engine.dispose();
        assert_eq!(engine.bus().subscriber_count(), 0);
        engine.report_end("snake", 12, true, None);
        assert_eq!(engine.earned_count(), 0);
    }

    #[test]
    fn start_events_do_not_trigger_evaluation() {
        let engine = engine();
        engine.report_start("snake");
        assert_eq!(engine.earned_count(), 0);
        assert!(engine.toasts().borrow().is_empty());
    }

    #[test]
    fn reset_clears_engine_owned_state() {
        let engine = engine();
        engine.report_end("snake", 12, true, None);
        assert!(engine.earned_count() > 0);

        engine.reset();
        assert_eq!(engine.earned_count(), 0);
        assert_eq!(engine.stats().read(), StatsSnapshot::default());
        assert!(engine.toasts().borrow().is_empty());
        assert_eq!(*engine.stats_sync().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn daily_extras_feed_streak_rules() {
        let backing = MemoryStore::new();
        backing.seed_raw(crate::DAILY_KEY, r#"{"streak":7,"completed_days":7}"#);
        let engine =
            ProgressEngine::new(Rc::new(backing), Rc::new(FixedClock::new(1_000)));
        engine.init();

        engine.report_end("snake", 1, false, None);
        let earned = engine.ledger().load();
        assert!(earned.contains_key("streak-starter"));
        assert!(earned.contains_key("streak-week"));
        assert!(!earned.contains_key("streak-month"));
    }
}
