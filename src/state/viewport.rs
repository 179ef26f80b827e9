//! Viewport Metrics - environment inputs for the trackers
//!
//! The embedding environment owns the real viewport; this module is the
//! in-process stand-in it writes into (`window.innerWidth`/`innerHeight`
//! and `window.scrollY` in a browser embedding). Update the metrics here
//! before emitting the corresponding native event so the dispatch tick
//! observes fresh values.
//!
//! # Example
//!
//! ```ignore
//! use viewport_events::state::viewport;
//!
//! viewport::set_viewport_size(800.0, 600.0);
//! viewport::set_scroll_top(120.0);
//! ```

use spark_signals::{Signal, signal};

thread_local! {
    /// Current vertical scroll offset, as reported by the environment.
    static SCROLL_TOP: Signal<f64> = signal(0.0);

    /// Current viewport width.
    static VIEWPORT_WIDTH: Signal<f64> = signal(0.0);

    /// Current viewport height.
    static VIEWPORT_HEIGHT: Signal<f64> = signal(0.0);
}

/// Record the current viewport size.
pub fn set_viewport_size(width: f64, height: f64) {
    VIEWPORT_WIDTH.with(|s| s.set(width));
    VIEWPORT_HEIGHT.with(|s| s.set(height));
}

/// Current viewport size as (width, height).
pub fn viewport_size() -> (f64, f64) {
    (
        VIEWPORT_WIDTH.with(|s| s.get()),
        VIEWPORT_HEIGHT.with(|s| s.get()),
    )
}

/// Record the current vertical scroll offset.
///
/// Negative values are accepted here; clamping is the scroll tracker's job.
pub fn set_scroll_top(top: f64) {
    SCROLL_TOP.with(|s| s.set(top));
}

/// Current vertical scroll offset.
pub fn scroll_top() -> f64 {
    SCROLL_TOP.with(|s| s.get())
}

/// Reset all metrics to zero (for testing).
pub fn reset_viewport() {
    set_viewport_size(0.0, 0.0);
    set_scroll_top(0.0);
}

// =============================================================================
// TESTS
// =============================================================================
