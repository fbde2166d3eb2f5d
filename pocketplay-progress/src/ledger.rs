//! Durable, grow-only record of unlocked achievement ids.

use crate::catalog::AchievementDef;
use crate::storage::{read_doc, write_doc};
use crate::sync::StoreSync;
use crate::{EARNED_KEY, ProgressStore};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Achievement id → unlock timestamp (ms since the Unix epoch).
///
/// Membership is append-only: a present id is never overwritten or removed
/// short of an explicit data reset.
pub type EarnedMap = BTreeMap<String, u64>;

/// System of record for "is this unlocked".
pub struct Ledger<S: ProgressStore> {
    store: Rc<S>,
    sync: Rc<StoreSync<EarnedMap>>,
}

impl<S: ProgressStore + 'static> Ledger<S> {
    #[must_use]
    pub fn new(store: Rc<S>) -> Self {
        let reader = Rc::clone(&store);
        let sync = Rc::new(StoreSync::new(
            move || read_doc::<EarnedMap, _>(reader.as_ref(), EARNED_KEY),
            EarnedMap::new(),
        ));
        Self { store, sync }
    }

    /// Update signal and snapshot cache for the earned map.
    #[must_use]
    pub fn sync(&self) -> &Rc<StoreSync<EarnedMap>> {
        &self.sync
    }

    /// Cached view of the earned map.
    #[must_use]
    pub fn earned(&self) -> Rc<EarnedMap> {
        self.sync.snapshot()
    }

    /// Fresh read of the durable map; absent or corrupt storage yields an
    /// empty map, never an error.
    #[must_use]
    pub fn load(&self) -> EarnedMap {
        read_doc(self.store.as_ref(), EARNED_KEY).unwrap_or_default()
    }

    /// Insert every id not already present, stamped with `now_ms`, and
    /// persist the map as one document.
    ///
    /// Presence is re-checked against a fresh load here, not against the
    /// map the evaluation ran on, so two passes racing from stale views
    /// cannot record or announce the same unlock twice. Returns only the
    /// entries actually inserted; that subset is what feeds notifications.
    pub fn merge(
        &self,
        newly: &[&'static AchievementDef],
        now_ms: u64,
    ) -> Vec<&'static AchievementDef> {
        if newly.is_empty() {
            return Vec::new();
        }
        let mut map = self.load();
        let mut inserted = Vec::new();
        for def in newly {
            if !map.contains_key(def.id) {
                map.insert(def.id.to_string(), now_ms);
                inserted.push(*def);
            }
        }
        if !inserted.is_empty() {
            log::debug!("unlocking {} achievement(s)", inserted.len());
            write_doc(self.store.as_ref(), EARNED_KEY, &map);
            self.sync.publish(map);
        }
        inserted
    }
}
