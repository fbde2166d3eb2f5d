#![forbid(unsafe_code)]
//! Browser bindings for the Pocketplay progress engine.
//!
//! Implements the core crate's storage and clock seams against
//! `localStorage` and `Date.now()`, bridges the platform `storage` event
//! into the synchronizers' cross-tab refresh path, and drives toast
//! auto-dismissal with cancelable timeouts. Rendering stays with the
//! embedding site shell.

pub mod clock;
pub mod cross_tab;
pub mod dom;
pub mod storage;
pub mod toasts;

pub use clock::WebClock;
pub use cross_tab::CrossTabBridge;
pub use storage::{WebProgressStore, WebStorageError};
pub use toasts::ToastTimerDriver;

// Re-export the core engine types for consumers of this crate.
pub use pocketplay_progress::*;

use std::rc::Rc;

/// Progress engine wired to browser storage and clock.
pub type WebProgressEngine = ProgressEngine<WebProgressStore, WebClock>;

/// Create a browser-backed engine with the cross-tab bridge attached.
///
/// The engine is initialized and ready for game reports. Keep the returned
/// bridge alive for as long as cross-tab updates should flow; when the
/// bridge cannot attach (no window event target), the engine still works
/// tab-locally and the condition is logged.
#[must_use]
pub fn create_web_engine() -> (Rc<WebProgressEngine>, Option<CrossTabBridge>) {
    let engine = Rc::new(ProgressEngine::new(
        Rc::new(WebProgressStore),
        Rc::new(WebClock),
    ));
    engine.init();
    let bridge = match CrossTabBridge::attach(
        Rc::clone(engine.stats_sync()),
        Rc::clone(engine.earned_sync()),
    ) {
        Ok(bridge) => Some(bridge),
        Err(err) => {
            log::warn!(
                "cross-tab bridge unavailable: {}",
                dom::js_error_message(&err)
            );
            None
        }
    };
    (engine, bridge)
}

/// Install the console panic hook once, when the embedding shell boots.
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}
