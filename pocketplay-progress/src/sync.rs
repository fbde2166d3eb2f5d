//! Shared-view synchronization over one durable key.
//!
//! Both the stats store and the ledger sit on top of this: every consumer
//! (same tab or, through the platform's storage-change bridge, another tab)
//! reads one cached, change-gated view of a mutable durable value.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Callback = Rc<dyn Fn()>;
type SubscriberList = Rc<RefCell<Vec<(u64, Callback)>>>;

/// Cached view over one durable document.
///
/// A new `Rc` is produced only when the recomputed value differs by
/// `PartialEq`, so unchanged reads keep reference identity and downstream
/// consumers can skip re-evaluation. Snapshots must be treated as immutable.
pub struct StoreSync<T> {
    read: Box<dyn Fn() -> Option<T>>,
    baseline: Rc<T>,
    cached: RefCell<Rc<T>>,
    stale: Cell<bool>,
    subscribers: SubscriberList,
    next_id: Cell<u64>,
}

impl<T: Clone + PartialEq + 'static> StoreSync<T> {
    /// Build a synchronizer over `read`, serving `baseline` until a durable
    /// value exists.
    pub fn new(read: impl Fn() -> Option<T> + 'static, baseline: T) -> Self {
        let baseline = Rc::new(baseline);
        Self {
            read: Box::new(read),
            cached: RefCell::new(Rc::clone(&baseline)),
            baseline,
            stale: Cell::new(true),
            subscribers: Rc::default(),
            next_id: Cell::new(0),
        }
    }

    /// Deterministic default served before any durable read, keeping first
    /// render identical whether or not durable storage is reachable.
    #[must_use]
    pub fn baseline(&self) -> Rc<T> {
        Rc::clone(&self.baseline)
    }

    /// Latest value. The same `Rc` comes back until the value changes.
    #[must_use]
    pub fn snapshot(&self) -> Rc<T> {
        if self.stale.replace(false) {
            let fresh = (self.read)().map_or_else(|| self.baseline(), Rc::new);
            let mut cached = self.cached.borrow_mut();
            if *fresh != **cached {
                *cached = fresh;
            }
        }
        Rc::clone(&self.cached.borrow())
    }

    /// Register a change callback; dropping the handle unsubscribes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> SyncHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        SyncHandle {
            id,
            subscribers: Rc::downgrade(&self.subscribers),
        }
    }

    /// Same-process change source: a local mutation just produced `value`.
    ///
    /// Carries the value instead of re-reading storage, so a tab whose
    /// durable write failed still serves the freshest state it computed.
    pub fn publish(&self, value: T) {
        self.stale.set(false);
        let changed = {
            let mut cached = self.cached.borrow_mut();
            if value == **cached {
                false
            } else {
                *cached = Rc::new(value);
                true
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Cross-tab change source: another tab mutated the durable key, so the
    /// cached view must be recomputed from storage.
    pub fn refresh(&self) {
        self.stale.set(true);
        let before = Rc::clone(&self.cached.borrow());
        let after = self.snapshot();
        if !Rc::ptr_eq(&before, &after) {
            self.notify();
        }
    }

    fn notify(&self) {
        // Snapshot the list so a callback may (un)subscribe mid-notify.
        let current: Vec<Callback> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in current {
            callback();
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

/// Subscription guard returned by [`StoreSync::subscribe`].
pub struct SyncHandle {
    id: u64,
    subscribers: Weak<RefCell<Vec<(u64, Callback)>>>,
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        if let Some(list) = self.subscribers.upgrade() {
            list.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}
