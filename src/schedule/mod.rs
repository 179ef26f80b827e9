//! Scheduling primitive: circles, their aggregator, and the shared clock.
//!
//! This is the capability the subscription layer consumes — it knows nothing
//! about event types or payload shapes, only about (interval, read, write)
//! entries and notification timestamps.

pub mod circle;
pub mod clock;
pub mod infinite;

pub use circle::{Circle, Entry, EntryId, EntryMeta, Hooks, Notify};
pub use clock::now_ms;
pub use infinite::Infinite;
