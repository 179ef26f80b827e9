//! Circle Registry and Subscription API
//!
//! One circle per event type, created lazily on first subscription and bound
//! to the event source for that type's tag. Circles whose payloads carry
//! derived state additionally get an updater entry (interval 0, no write)
//! that refreshes the shared scroll/resize cache once per dispatch tick;
//! because entries run in registration order and the updater is registered
//! at circle creation, every subscriber read on that tick observes the same
//! fresh snapshot.
//!
//! Subscriber callbacks are `Rc<dyn Fn(&Payload)>` so that
//! [`unsubscribe`] can match them by pointer identity — the same closure
//! `Rc` subscribed twice yields two independent entries, and one
//! `unsubscribe` call removes both.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use viewport_events::{subscribe, Callback, EventType, SubscribeOptions};
//!
//! let callback: Callback = Rc::new(|payload| {
//!     if let Some(scroll) = payload.scroll {
//!         println!("top={} delta={}", scroll.top, scroll.delta);
//!     }
//! });
//!
//! let subscription = subscribe(
//!     EventType::Scroll,
//!     callback,
//!     SubscribeOptions::throttle_rate(100),
//! );
//!
//! // ... later
//! subscription.unsubscribe();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use spark_signals::{Signal, signal};

use crate::schedule::{Circle, Entry, EntryId, EntryMeta, Hooks, Infinite};
use crate::source;
use crate::state::trackers::{ResizeTracker, ScrollTracker};
use crate::state::viewport;
use crate::types::{
    DEFAULT_THROTTLE_MS, EventType, Payload, ResizeInfo, ScrollInfo, SubscribeOptions,
};

/// Subscriber callback. Cloned `Rc`s share identity for [`unsubscribe`].
pub type Callback = Rc<dyn Fn(&Payload)>;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// One circle per event type, keyed by the type tag.
    static CIRCLES: RefCell<HashMap<EventType, Rc<Circle<Payload>>>> =
        RefCell::new(HashMap::new());

    /// Aggregate over all created circles.
    static INFINITE: RefCell<Infinite<Payload>> = RefCell::new(Infinite::new());

    /// Listener records for reverse lookup: (event type, entry id) → callback.
    /// Entry ids are only unique per circle, hence the compound key.
    static RECORDS: RefCell<HashMap<(EventType, EntryId), Callback>> =
        RefCell::new(HashMap::new());

    /// Tracker instances, driven only by the updater entries.
    static SCROLL_TRACKER: RefCell<ScrollTracker> = RefCell::new(ScrollTracker::new());
    static RESIZE_TRACKER: RefCell<ResizeTracker> = RefCell::new(ResizeTracker::new());

    /// Shared derived-state caches, written once per dispatch tick.
    static SCROLL_INFO: Signal<Option<ScrollInfo>> = signal(None);
    static RESIZE_INFO: Signal<Option<ResizeInfo>> = signal(None);
}

/// Last scroll snapshot computed by a dispatch tick, if any.
pub fn scroll_info() -> Option<ScrollInfo> {
    SCROLL_INFO.with(|s| s.get())
}

/// Last resize snapshot computed by a dispatch tick, if any.
pub fn resize_info() -> Option<ResizeInfo> {
    RESIZE_INFO.with(|s| s.get())
}

// =============================================================================
// Circle Creation
// =============================================================================

/// Get or lazily create the circle for an event type.
///
/// Creation wires the circle's listen/unlisten hooks to the event source
/// under the type's tag, registers the derived-state updater where the
/// payload calls for one, and adds the circle to the aggregate. Circles are
/// never torn down when their last subscriber leaves; `reset_registry` is
/// the only teardown path.
fn circle_for(event_type: &EventType) -> Rc<Circle<Payload>> {
    let existing = CIRCLES.with(|circles| circles.borrow().get(event_type).cloned());
    if let Some(circle) = existing {
        return circle;
    }

    let listen_tag = event_type.as_str().to_string();
    let unlisten_tag = listen_tag.clone();
    let circle = Rc::new(Circle::new(Hooks {
        listen: Box::new(move |notify| source::add_listener(&listen_tag, notify)),
        unlisten: Box::new(move |notify| source::remove_listener(&unlisten_tag, notify)),
    }));

    // Interval 0: the cache must be fresh on every tick, ahead of any
    // subscriber read, whatever throttle rates the subscribers chose.
    match event_type {
        EventType::Scroll | EventType::TouchMove => {
            circle.register(scroll_updater());
        }
        EventType::Resize => {
            circle.register(resize_updater());
        }
        EventType::Custom(_) => {}
    }

    INFINITE.with(|infinite| infinite.borrow_mut().add(circle.clone()));
    CIRCLES.with(|circles| {
        circles
            .borrow_mut()
            .insert(event_type.clone(), circle.clone())
    });

    circle
}

fn scroll_updater() -> Entry<Payload> {
    Entry {
        meta: EntryMeta { interval: 0 },
        read: Box::new(|| {
            let info = SCROLL_TRACKER.with(|t| t.borrow_mut().track(viewport::scroll_top()));
            SCROLL_INFO.with(|s| s.set(Some(info)));
            Payload::bare(EventType::Scroll)
        }),
        write: None,
    }
}

fn resize_updater() -> Entry<Payload> {
    Entry {
        meta: EntryMeta { interval: 0 },
        read: Box::new(|| {
            let (width, height) = viewport::viewport_size();
            let info = RESIZE_TRACKER.with(|t| t.borrow_mut().track(width, height));
            RESIZE_INFO.with(|s| s.set(Some(info)));
            Payload::bare(EventType::Resize)
        }),
        write: None,
    }
}

fn build_payload(event_type: &EventType) -> Payload {
    let mut payload = Payload::bare(event_type.clone());
    match event_type {
        EventType::Scroll | EventType::TouchMove => payload.scroll = scroll_info(),
        EventType::Resize => payload.resize = resize_info(),
        EventType::Custom(_) => {}
    }
    payload
}

// =============================================================================
// Subscription API
// =============================================================================

/// Handle returned by [`subscribe`]; removes exactly that subscription.
#[derive(Debug)]
pub struct Subscription {
    event_type: EventType,
    id: EntryId,
}

impl Subscription {
    /// The event type this subscription is attached to.
    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// Remove this subscription's entry from its circle, and its record.
    pub fn unsubscribe(self) {
        remove_entry(&self.event_type, self.id);
    }
}

/// Subscribe a callback to a throttled event stream.
///
/// Creates the circle for `event_type` on first use (which binds the native
/// listener), then registers an entry whose read builds the payload for that
/// type and whose write invokes `callback`. The entry fires at most once per
/// `options.throttle_rate` milliseconds (default 50).
///
/// Unknown event types are not rejected: they get a circle bound under their
/// tag and a bare payload.
pub fn subscribe(
    event_type: EventType,
    callback: Callback,
    options: SubscribeOptions,
) -> Subscription {
    let circle = circle_for(&event_type);
    let interval = options.throttle_rate.unwrap_or(DEFAULT_THROTTLE_MS);

    let read_type = event_type.clone();
    let write_callback = callback.clone();
    let id = circle.register(Entry {
        meta: EntryMeta { interval },
        read: Box::new(move || build_payload(&read_type)),
        write: Some(Box::new(move |payload| write_callback(payload))),
    });

    RECORDS.with(|records| {
        records
            .borrow_mut()
            .insert((event_type.clone(), id), callback)
    });

    Subscription { event_type, id }
}

/// Remove every subscription matching this (event type, callback) pair.
///
/// The callback is matched by `Rc` pointer identity, so duplicate
/// subscriptions made with clones of the same `Rc` are all removed in one
/// call. Silently a no-op when no circle exists for the type or nothing
/// matches — double-unsubscribe is fine.
pub fn unsubscribe(event_type: &EventType, callback: &Callback) {
    let matching: Vec<EntryId> = RECORDS.with(|records| {
        records
            .borrow()
            .iter()
            .filter(|((recorded_type, _), recorded_callback)| {
                recorded_type == event_type && Rc::ptr_eq(recorded_callback, callback)
            })
            .map(|((_, id), _)| *id)
            .collect()
    });

    for id in matching {
        remove_entry(event_type, id);
    }
}

/// Remove one entry from its circle and drop its listener record.
/// Both unsubscribe paths land here, so records never outlive their entries.
fn remove_entry(event_type: &EventType, id: EntryId) {
    let circle = CIRCLES.with(|circles| circles.borrow().get(event_type).cloned());
    if let Some(circle) = circle {
        circle.unregister(id);
    }
    RECORDS.with(|records| records.borrow_mut().remove(&(event_type.clone(), id)));
}

// =============================================================================
// Introspection & Teardown
// =============================================================================

/// Number of registered entries in an event type's circle, updater included.
/// 0 when no circle exists.
pub fn entry_count(event_type: &EventType) -> usize {
    CIRCLES.with(|circles| {
        circles
            .borrow()
            .get(event_type)
            .map_or(0, |circle| circle.len())
    })
}

/// Number of live listener records (for testing).
pub fn record_count() -> usize {
    RECORDS.with(|records| records.borrow().len())
}

/// Unbind every circle and clear all registry state (for testing).
pub fn reset_registry() {
    CIRCLES.with(|circles| {
        let mut circles = circles.borrow_mut();
        for circle in circles.values() {
            circle.unbind();
        }
        circles.clear();
    });
    INFINITE.with(|infinite| *infinite.borrow_mut() = Infinite::new());
    RECORDS.with(|records| records.borrow_mut().clear());
    SCROLL_TRACKER.with(|t| *t.borrow_mut() = ScrollTracker::new());
    RESIZE_TRACKER.with(|t| *t.borrow_mut() = ResizeTracker::new());
    SCROLL_INFO.with(|s| s.set(None));
    RESIZE_INFO.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn setup() {
        reset_registry();
        source::reset_source();
        viewport::reset_viewport();
    }

    fn counting_callback(count: Rc<Cell<u32>>) -> Callback {
        Rc::new(move |_| count.set(count.get() + 1))
    }

    #[test]
    fn test_subscribe_binds_native_listener() {
        setup();

        assert_eq!(source::listener_count("scroll"), 0);

        let _sub = subscribe(
            EventType::Scroll,
            counting_callback(Rc::new(Cell::new(0))),
            SubscribeOptions::default(),
        );

        assert_eq!(source::listener_count("scroll"), 1);

        // Second subscription reuses the circle and its binding
        let _sub2 = subscribe(
            EventType::Scroll,
            counting_callback(Rc::new(Cell::new(0))),
            SubscribeOptions::default(),
        );
        assert_eq!(source::listener_count("scroll"), 1);
    }

    #[test]
    fn test_circle_per_event_type_is_idempotent() {
        setup();

        let first = circle_for(&EventType::Resize);
        let second = circle_for(&EventType::Resize);
        assert!(Rc::ptr_eq(&first, &second));

        // Updater entry is registered exactly once
        assert_eq!(entry_count(&EventType::Resize), 1);
    }

    #[test]
    fn test_scroll_payload_augmentation() {
        setup();

        let seen: Rc<RefCell<Vec<Payload>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let callback: Callback = Rc::new(move |payload| sink.borrow_mut().push(payload.clone()));

        let _sub = subscribe(EventType::Scroll, callback, SubscribeOptions::default());

        viewport::set_scroll_top(120.0);
        source::emit_at("scroll", 0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event_type, EventType::Scroll);
        let scroll = seen[0].scroll.expect("scroll info");
        assert_eq!(scroll.top, 120.0);
        assert_eq!(scroll.delta, 120.0);
        assert!(seen[0].resize.is_none());
    }

    #[test]
    fn test_custom_event_type_gets_bare_payload() {
        setup();

        let seen: Rc<RefCell<Vec<Payload>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let callback: Callback = Rc::new(move |payload| sink.borrow_mut().push(payload.clone()));

        let _sub = subscribe(
            EventType::from("wheel"),
            callback,
            SubscribeOptions::default(),
        );
        assert_eq!(source::listener_count("wheel"), 1);

        source::emit_at("wheel", 0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].event_type.as_str(), "wheel");
        assert!(seen[0].scroll.is_none());
        assert!(seen[0].resize.is_none());
    }

    #[test]
    fn test_independent_circles_per_type() {
        setup();

        let scroll_count = Rc::new(Cell::new(0));
        let resize_count = Rc::new(Cell::new(0));

        let scroll_cb = counting_callback(scroll_count.clone());
        let sub = subscribe(EventType::Scroll, scroll_cb.clone(), SubscribeOptions::default());
        let _resize_sub = subscribe(
            EventType::Resize,
            counting_callback(resize_count.clone()),
            SubscribeOptions::default(),
        );

        source::emit_at("scroll", 0);
        source::emit_at("resize", 0);
        assert_eq!(scroll_count.get(), 1);
        assert_eq!(resize_count.get(), 1);

        // Removing all scroll subscribers leaves resize dispatch untouched
        sub.unsubscribe();
        unsubscribe(&EventType::Scroll, &scroll_cb);

        source::emit_at("scroll", 100);
        source::emit_at("resize", 100);
        assert_eq!(scroll_count.get(), 1);
        assert_eq!(resize_count.get(), 2);
    }

    #[test]
    fn test_duplicate_subscriptions_bulk_unsubscribe() {
        setup();

        let count = Rc::new(Cell::new(0));
        let callback = counting_callback(count.clone());

        let _a = subscribe(
            EventType::Scroll,
            callback.clone(),
            SubscribeOptions::throttle_rate(10),
        );
        let _b = subscribe(
            EventType::Scroll,
            callback.clone(),
            SubscribeOptions::throttle_rate(10),
        );

        source::emit_at("scroll", 0);
        assert_eq!(count.get(), 2); // both fire

        unsubscribe(&EventType::Scroll, &callback);
        assert_eq!(record_count(), 0);

        source::emit_at("scroll", 100);
        assert_eq!(count.get(), 2); // both removed
    }

    #[test]
    fn test_unsubscribe_without_circle_is_noop() {
        setup();

        let callback = counting_callback(Rc::new(Cell::new(0)));
        unsubscribe(&EventType::Scroll, &callback);
        unsubscribe(&EventType::from("wheel"), &callback);
    }

    #[test]
    fn test_unsubscribe_wrong_callback_is_noop() {
        setup();

        let count = Rc::new(Cell::new(0));
        let subscribed = counting_callback(count.clone());
        let other = counting_callback(Rc::new(Cell::new(0)));

        let _sub = subscribe(EventType::Scroll, subscribed, SubscribeOptions::default());
        unsubscribe(&EventType::Scroll, &other);

        source::emit_at("scroll", 0);
        assert_eq!(count.get(), 1); // still subscribed
    }

    #[test]
    fn test_records_removed_on_handle_unsubscribe() {
        setup();

        let sub = subscribe(
            EventType::Scroll,
            counting_callback(Rc::new(Cell::new(0))),
            SubscribeOptions::default(),
        );
        assert_eq!(record_count(), 1);

        sub.unsubscribe();
        assert_eq!(record_count(), 0);
        // Updater entry remains; the subscriber entry is gone
        assert_eq!(entry_count(&EventType::Scroll), 1);
    }

    #[test]
    fn test_throttle_rate_gates_delivery() {
        setup();

        let count = Rc::new(Cell::new(0));
        let _sub = subscribe(
            EventType::Scroll,
            counting_callback(count.clone()),
            SubscribeOptions::throttle_rate(10),
        );

        source::emit_at("scroll", 0);
        source::emit_at("scroll", 3);
        source::emit_at("scroll", 6);
        assert_eq!(count.get(), 1);

        source::emit_at("scroll", 12);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_updater_runs_before_subscriber_reads() {
        setup();

        // Subscriber at 10ms, updater at 0ms: even on ticks where only the
        // subscriber is due, the cache was refreshed first on that tick.
        let tops: Rc<RefCell<Vec<f64>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = tops.clone();
        let callback: Callback = Rc::new(move |payload| {
            sink.borrow_mut().push(payload.scroll.expect("scroll").top);
        });

        let _sub = subscribe(
            EventType::Scroll,
            callback,
            SubscribeOptions::throttle_rate(10),
        );

        viewport::set_scroll_top(10.0);
        source::emit_at("scroll", 0);

        viewport::set_scroll_top(30.0);
        source::emit_at("scroll", 10);

        assert_eq!(*tops.borrow(), vec![10.0, 30.0]);
    }

    #[test]
    fn test_touchmove_shares_scroll_tracker() {
        setup();

        let deltas: Rc<RefCell<Vec<f64>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = deltas.clone();
        let callback: Callback = Rc::new(move |payload| {
            sink.borrow_mut().push(payload.scroll.expect("scroll").delta);
        });

        let _sub = subscribe(EventType::TouchMove, callback, SubscribeOptions::default());

        viewport::set_scroll_top(40.0);
        source::emit_at("touchmove", 0);

        viewport::set_scroll_top(55.0);
        source::emit_at("touchmove", 50);

        assert_eq!(*deltas.borrow(), vec![40.0, 15.0]);
    }

    #[test]
    fn test_unsubscribe_from_own_callback() {
        setup();

        let count = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Callback>>> = Rc::new(RefCell::new(None));

        let inner_count = count.clone();
        let inner_slot = slot.clone();
        let callback: Callback = Rc::new(move |_| {
            inner_count.set(inner_count.get() + 1);
            if let Some(me) = inner_slot.borrow_mut().take() {
                unsubscribe(&EventType::Scroll, &me);
            }
        });
        *slot.borrow_mut() = Some(callback.clone());

        let _sub = subscribe(EventType::Scroll, callback, SubscribeOptions::default());

        source::emit_at("scroll", 0);
        assert_eq!(count.get(), 1);
        assert_eq!(record_count(), 0);

        source::emit_at("scroll", 100);
        assert_eq!(count.get(), 1); // one-shot
    }

    #[test]
    fn test_reset_registry_unbinds_sources() {
        setup();

        let _sub = subscribe(
            EventType::Scroll,
            counting_callback(Rc::new(Cell::new(0))),
            SubscribeOptions::default(),
        );
        assert_eq!(source::listener_count("scroll"), 1);

        reset_registry();
        assert_eq!(source::listener_count("scroll"), 0);
        assert_eq!(record_count(), 0);
        assert_eq!(entry_count(&EventType::Scroll), 0);
    }
}
