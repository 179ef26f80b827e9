//! Derived-State Trackers - scroll and resize snapshots with deltas
//!
//! Each tracker is a small struct owning its own "last observed" fields and
//! producing a fresh snapshot per call. Trackers are not idempotent: the
//! first call's delta equals the absolute value (previous treated as 0), and
//! repeat calls with unchanged input yield delta 0 from then on.
//!
//! The registry owns one instance of each and drives it from a dedicated
//! updater entry, so every subscriber on a dispatch tick reads the same
//! snapshot (see [`crate::registry`]).

use crate::types::{ResizeInfo, ScrollInfo, SizeDelta};

// =============================================================================
// Scroll Tracker
// =============================================================================

/// Tracks the vertical scroll offset and its change between calls.
#[derive(Debug, Default)]
pub struct ScrollTracker {
    last_top: Option<f64>,
}

impl ScrollTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a raw scroll offset and produce the current snapshot.
    ///
    /// The raw value is clamped to ≥ 0 (mobile overscroll reports negative
    /// offsets). `last_top` is only updated when the offset actually changed,
    /// so an unchanged observation leaves the delta basis untouched.
    pub fn track(&mut self, raw_top: f64) -> ScrollInfo {
        let top = raw_top.max(0.0);
        let delta = top - self.last_top.unwrap_or(0.0);

        if self.last_top != Some(top) {
            self.last_top = Some(top);
        }

        ScrollInfo { top, delta }
    }
}

// =============================================================================
// Resize Tracker
// =============================================================================

/// Tracks the viewport size and its per-dimension change between calls.
///
/// Width and height keep independent "last" values: a call that changes only
/// the width updates `last_width` and leaves `last_height` alone.
#[derive(Debug, Default)]
pub struct ResizeTracker {
    last_width: Option<f64>,
    last_height: Option<f64>,
}

impl ResizeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the current viewport size and produce the snapshot.
    pub fn track(&mut self, width: f64, height: f64) -> ResizeInfo {
        let delta = SizeDelta {
            width: width - self.last_width.unwrap_or(0.0),
            height: height - self.last_height.unwrap_or(0.0),
        };

        if self.last_width != Some(width) {
            self.last_width = Some(width);
        }
        if self.last_height != Some(height) {
            self.last_height = Some(height);
        }

        ResizeInfo {
            width,
            height,
            delta,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
