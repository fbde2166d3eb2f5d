//! Game lifecycle events and the typed pub/sub bridge games publish into.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Lifecycle event reported by a game module.
///
/// Events are ephemeral: they exist for the duration of one dispatch and are
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    /// A play session began.
    Start { slug: String, timestamp_ms: u64 },
    /// A play session finished with its final score.
    End {
        slug: String,
        score: i64,
        completed: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u32>,
        timestamp_ms: u64,
    },
    /// A level within a running session was completed.
    LevelComplete {
        slug: String,
        level: u32,
        score: i64,
        timestamp_ms: u64,
    },
}

impl GameEvent {
    /// Slug of the game that reported this event.
    #[must_use]
    pub fn slug(&self) -> &str {
        match self {
            Self::Start { slug, .. } | Self::End { slug, .. } | Self::LevelComplete { slug, .. } => {
                slug
            }
        }
    }

    /// When the event happened, per the reporting game's clock.
    #[must_use]
    pub const fn timestamp_ms(&self) -> u64 {
        match self {
            Self::Start { timestamp_ms, .. }
            | Self::End { timestamp_ms, .. }
            | Self::LevelComplete { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}

/// Identifier handed out by [`EventBus::subscribe`]; pass it back to
/// [`EventBus::unsubscribe`] to stop delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Rc<dyn Fn(&GameEvent)>;

/// Typed fire-and-forget pub/sub channel.
///
/// Dispatch is synchronous call-through in registration order; subscribers
/// must not block and defer long-running reactions themselves. Publishing
/// with no subscribers drops the event (no buffering, no replay), and the
/// bridge itself never touches durable storage.
#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<Vec<(u64, Subscriber)>>,
    next_id: Cell<u64>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and return its removal id.
    pub fn subscribe(&self, callback: impl Fn(&GameEvent) + 'static) -> SubscriberId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        SubscriberId(id)
    }

    /// Remove a subscriber. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.borrow_mut().retain(|(sid, _)| *sid != id.0);
    }

    /// Dispatch an event to every current subscriber.
    pub fn publish(&self, event: &GameEvent) {
        // Snapshot the list so a subscriber may (un)subscribe mid-dispatch.
        let current: Vec<Subscriber> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in current {
            callback(event);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
