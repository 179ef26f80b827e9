//! # viewport-events
//!
//! Throttled subscriptions to high-frequency viewport events (scroll,
//! resize, touchmove), with derived positional state (scroll offset/delta,
//! viewport size/delta) computed once per dispatch tick and shared by all
//! subscribers.
//!
//! ## Architecture
//!
//! One scheduling circle per event type batches every throttled listener
//! behind a single native binding:
//!
//! ```text
//! native event → source::emit → circle dispatch → entry reads (payload)
//!                                               → entry writes (callbacks)
//! ```
//!
//! Each entry runs at its own interval, so a 100ms subscriber and a 16ms
//! subscriber coexist on the same circle. Entries may be added and removed
//! while a dispatch is in flight, including from their own callback.
//!
//! ## Modules
//!
//! - [`types`] - Event tags, payload snapshots, subscribe options
//! - [`schedule`] - The circle scheduling primitive and its aggregator
//! - [`source`] - Simulated native event source (`emit` / `emit_at`)
//! - [`state`] - Derived-state trackers and viewport metrics
//! - [`registry`] - Circle registry and the subscribe/unsubscribe API
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use viewport_events::{
//!     emit, set_viewport_size, subscribe, Callback, EventType, SubscribeOptions,
//! };
//!
//! let callback: Callback = Rc::new(|payload| {
//!     let resize = payload.resize.unwrap();
//!     println!("{}x{} (Δw {})", resize.width, resize.height, resize.delta.width);
//! });
//!
//! let subscription = subscribe(EventType::Resize, callback, SubscribeOptions::default());
//!
//! // The embedding reports environment changes and fires the native event:
//! set_viewport_size(800.0, 600.0);
//! emit("resize");
//!
//! subscription.unsubscribe();
//! ```

pub mod registry;
pub mod schedule;
pub mod source;
pub mod state;
pub mod types;

// Re-export the public surface
pub use registry::{
    Callback, Subscription, entry_count, record_count, reset_registry, resize_info, scroll_info,
    subscribe, unsubscribe,
};

pub use source::{emit, emit_at, listener_count, reset_source};

pub use state::{
    ResizeTracker, ScrollTracker, reset_viewport, scroll_top, set_scroll_top, set_viewport_size,
    viewport_size,
};

pub use types::{
    DEFAULT_THROTTLE_MS, EventType, Payload, ResizeInfo, ScrollInfo, SizeDelta, SubscribeOptions,
};
