//! Infinite - aggregator over scheduling circles
//!
//! Collects the circles created by the registry so they can be driven as a
//! group. Event-source notifications reach each circle directly through its
//! binding; the aggregator exists for coordinated ticks (tests, embeddings
//! that pump a frame loop themselves) and teardown bookkeeping.

use std::rc::Rc;

use super::circle::Circle;
use super::clock::now_ms;

pub struct Infinite<T> {
    circles: Vec<Rc<Circle<T>>>,
}

impl<T: 'static> Infinite<T> {
    pub fn new() -> Self {
        Self {
            circles: Vec::new(),
        }
    }

    /// Add a circle to the aggregate.
    pub fn add(&mut self, circle: Rc<Circle<T>>) {
        self.circles.push(circle);
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Tick every circle at an explicit timestamp (ms).
    pub fn notify_all_at(&self, now: u64) {
        for circle in &self.circles {
            circle.notify_at(now);
        }
    }

    /// Tick every circle stamped with the monotonic clock.
    pub fn notify_all(&self) {
        self.notify_all_at(now_ms());
    }

    /// Detach every circle's native binding.
    pub fn unbind_all(&self) {
        for circle in &self.circles {
            circle.unbind();
        }
    }
}

impl<T: 'static> Default for Infinite<T> {
    fn default() -> Self {
        Self::new()
    }
}
