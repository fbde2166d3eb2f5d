//! Cross-tab change notifications via the platform `storage` event.

use crate::dom::window;
use pocketplay_progress::{EARNED_KEY, EarnedMap, STATS_KEY, StatsSnapshot, StoreSync};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::StorageEvent;

/// Forwards another tab's mutations of the progress keys into the matching
/// synchronizer's refresh path. Dropping the bridge removes the listener,
/// so no callback fires against a torn-down engine.
pub struct CrossTabBridge {
    listener: Closure<dyn FnMut(StorageEvent)>,
}

impl CrossTabBridge {
    /// Attach to the window's `storage` event. Events for keys other than
    /// the two engine-owned documents are ignored.
    ///
    /// # Errors
    /// Returns an error if the listener cannot be registered.
    pub fn attach(
        stats: Rc<StoreSync<StatsSnapshot>>,
        earned: Rc<StoreSync<EarnedMap>>,
    ) -> Result<Self, JsValue> {
        let listener = Closure::wrap(Box::new(move |event: StorageEvent| {
            match event.key().as_deref() {
                Some(STATS_KEY) => stats.refresh(),
                Some(EARNED_KEY) => earned.refresh(),
                _ => {}
            }
        }) as Box<dyn FnMut(StorageEvent)>);
        window()
            .add_event_listener_with_callback("storage", listener.as_ref().unchecked_ref())?;
        Ok(Self { listener })
    }
}

impl Drop for CrossTabBridge {
    fn drop(&mut self) {
        let _ = window()
            .remove_event_listener_with_callback("storage", self.listener.as_ref().unchecked_ref());
    }
}
