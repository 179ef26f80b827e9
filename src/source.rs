//! Event Source - simulated native event stream
//!
//! Stand-in for the environment's `addEventListener`/`removeEventListener`
//! pair. Circles bind their notify callbacks here (keyed by the event tag)
//! and the embedding calls [`emit`] whenever the corresponding native event
//! fires. [`emit_at`] takes an explicit timestamp for simulated time.
//!
//! Listener identity is the `Rc` pointer of the notify callback, so the
//! exact callback that was added is the one removed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::schedule::{Notify, now_ms};

thread_local! {
    static LISTENERS: RefCell<HashMap<String, Vec<Notify>>> = RefCell::new(HashMap::new());
}

/// Attach a notify callback to an event tag.
pub fn add_listener(tag: &str, notify: &Notify) {
    LISTENERS.with(|listeners| {
        listeners
            .borrow_mut()
            .entry(tag.to_string())
            .or_default()
            .push(notify.clone());
    });
}

/// Detach a notify callback from an event tag (matched by `Rc` identity).
/// Unknown tags or callbacks are a silent no-op.
pub fn remove_listener(tag: &str, notify: &Notify) {
    LISTENERS.with(|listeners| {
        let mut listeners = listeners.borrow_mut();
        if let Some(attached) = listeners.get_mut(tag) {
            attached.retain(|n| !Rc::ptr_eq(n, notify));
            if attached.is_empty() {
                listeners.remove(tag);
            }
        }
    });
}

/// Fire a native event, stamped with the monotonic clock.
pub fn emit(tag: &str) {
    emit_at(tag, now_ms());
}

/// Fire a native event at an explicit timestamp (ms).
///
/// Listeners are snapshotted before any runs, so a callback that adds or
/// removes listeners mid-emit does not disturb the iteration; listeners
/// added during the emit only see the next one.
pub fn emit_at(tag: &str, now: u64) {
    let snapshot: Vec<Notify> =
        LISTENERS.with(|listeners| listeners.borrow().get(tag).cloned().unwrap_or_default());

    for notify in snapshot {
        notify(now);
    }
}

/// Number of callbacks attached to an event tag.
pub fn listener_count(tag: &str) -> usize {
    LISTENERS.with(|listeners| listeners.borrow().get(tag).map_or(0, |l| l.len()))
}

/// Drop all listeners (for testing).
pub fn reset_source() {
    LISTENERS.with(|listeners| listeners.borrow_mut().clear());
}

// =============================================================================
// TESTS
// =============================================================================
