//! Core types for viewport-events.
//!
//! These types define what flows through the subscription pipeline: the
//! event tags that key the circle registry and the payload snapshots
//! delivered to subscriber callbacks.

// =============================================================================
// Event Types
// =============================================================================

/// Default throttle interval in milliseconds for subscriber entries.
pub const DEFAULT_THROTTLE_MS: u64 = 50;

/// Tag identifying a native event stream.
///
/// Acts as the key into the circle registry. The well-known tags get
/// derived-state augmentation on their payloads; any other tag is accepted
/// as-is via [`EventType::Custom`] and delivered with a bare payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Scroll,
    Resize,
    TouchMove,
    Custom(String),
}

impl EventType {
    /// The native event name this tag binds to (e.g. `"scroll"`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::TouchMove => "touchmove",
            Self::Custom(tag) => tag,
        }
    }
}

impl From<&str> for EventType {
    fn from(tag: &str) -> Self {
        match tag {
            "scroll" => Self::Scroll,
            "resize" => Self::Resize,
            "touchmove" => Self::TouchMove,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Derived State Snapshots
// =============================================================================

/// Scroll snapshot: current vertical offset plus delta from the previous one.
///
/// `top` is clamped to ≥ 0 (some mobile browsers report negative offsets
/// during overscroll). The first snapshot ever has `delta == top`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollInfo {
    pub top: f64,
    pub delta: f64,
}

/// Per-dimension change between two resize snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeDelta {
    pub width: f64,
    pub height: f64,
}

/// Viewport size snapshot plus delta from the previous one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResizeInfo {
    pub width: f64,
    pub height: f64,
    pub delta: SizeDelta,
}

// =============================================================================
// Payload
// =============================================================================

/// What a subscriber callback receives on each throttled dispatch.
///
/// `scroll` is populated for [`EventType::Scroll`] and [`EventType::TouchMove`]
/// subscriptions, `resize` for [`EventType::Resize`]; custom tags get a bare
/// payload with both fields `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    pub event_type: EventType,
    pub scroll: Option<ScrollInfo>,
    pub resize: Option<ResizeInfo>,
}

impl Payload {
    /// Payload with no derived-state augmentation.
    pub fn bare(event_type: EventType) -> Self {
        Self {
            event_type,
            scroll: None,
            resize: None,
        }
    }
}

// =============================================================================
// Subscribe Options
// =============================================================================

/// Options for [`subscribe`](crate::subscribe).
///
/// `throttle_rate` is the minimum number of milliseconds between successive
/// deliveries to this subscriber; `None` means [`DEFAULT_THROTTLE_MS`].
/// The value is not validated here (0 means "every dispatch").
#[derive(Clone, Copy, Debug, Default)]
pub struct SubscribeOptions {
    pub throttle_rate: Option<u64>,
}

impl SubscribeOptions {
    /// Options with an explicit throttle rate in milliseconds.
    pub fn throttle_rate(ms: u64) -> Self {
        Self {
            throttle_rate: Some(ms),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
