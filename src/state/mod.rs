//! State modules: derived-state trackers and viewport metrics.

pub mod trackers;
pub mod viewport;

pub use trackers::{ResizeTracker, ScrollTracker};
pub use viewport::{
    reset_viewport, scroll_top, set_scroll_top, set_viewport_size, viewport_size,
};
