//! Per-toast auto-dismiss timers over `setTimeout`.

use crate::dom::{js_error_message, window};
use pocketplay_progress::ToastQueue;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

struct PendingTimer {
    seq: u64,
    timeout_id: i32,
    _closure: Closure<dyn FnMut()>,
}

/// Arms one cancelable timeout per visible toast and dismisses the toast
/// when it fires.
///
/// Teardown (drop) cancels every outstanding handle, so no callback acts on
/// stale state after the host component unmounts. Timer failures are
/// isolated per item and never touch the ledger or the stats store.
pub struct ToastTimerDriver {
    queue: Rc<RefCell<ToastQueue>>,
    on_change: Rc<dyn Fn()>,
    pending: Rc<RefCell<Vec<PendingTimer>>>,
}

impl ToastTimerDriver {
    /// `on_change` is invoked after any toast leaves the queue, giving the
    /// rendering collaborator its re-render signal.
    #[must_use]
    pub fn new(queue: Rc<RefCell<ToastQueue>>, on_change: impl Fn() + 'static) -> Self {
        Self {
            queue,
            on_change: Rc::new(on_change),
            pending: Rc::default(),
        }
    }

    /// Arm the auto-dismiss timer for one enqueued toast.
    pub fn arm(&self, seq: u64) {
        let delay_ms = i32::try_from(self.queue.borrow().display_ms()).unwrap_or(i32::MAX);
        let queue = Rc::clone(&self.queue);
        let on_change = Rc::clone(&self.on_change);
        let pending = Rc::clone(&self.pending);
        let closure = Closure::wrap(Box::new(move || {
            pending.borrow_mut().retain(|timer| timer.seq != seq);
            if queue.borrow_mut().dismiss(seq) {
                on_change();
            }
        }) as Box<dyn FnMut()>);

        match window().set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms,
        ) {
            Ok(timeout_id) => self.pending.borrow_mut().push(PendingTimer {
                seq,
                timeout_id,
                _closure: closure,
            }),
            Err(err) => log::warn!("failed to arm toast timer: {}", js_error_message(&err)),
        }
    }

    /// Arm timers for a whole batch, oldest first.
    pub fn arm_batch(&self, seqs: &[u64]) {
        for seq in seqs {
            self.arm(*seq);
        }
    }

    /// Explicit user dismissal: cancel the timer and drop the toast now.
    pub fn dismiss_now(&self, seq: u64) {
        self.cancel(seq);
        if self.queue.borrow_mut().dismiss(seq) {
            (self.on_change)();
        }
    }

    /// Cancel one outstanding timer without touching the queue.
    pub fn cancel(&self, seq: u64) {
        let mut pending = self.pending.borrow_mut();
        if let Some(position) = pending.iter().position(|timer| timer.seq == seq) {
            let timer = pending.remove(position);
            window().clear_timeout_with_handle(timer.timeout_id);
        }
    }

    /// Cancel every outstanding timer.
    pub fn cancel_all(&self) {
        for timer in self.pending.borrow_mut().drain(..) {
            window().clear_timeout_with_handle(timer.timeout_id);
        }
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Drop for ToastTimerDriver {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
