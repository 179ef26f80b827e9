//! Monotonic millisecond clock shared by circles and the event source.
//!
//! Dispatch is timestamp-driven: `notify`/`emit` stamp the current time and
//! every elapsed-interval check compares against it. Tests bypass this clock
//! entirely by passing explicit timestamps to `notify_at`/`emit_at`.

use std::time::Instant;

thread_local! {
    static EPOCH: Instant = Instant::now();
}

/// Milliseconds elapsed since this thread first touched the clock.
pub fn now_ms() -> u64 {
    EPOCH.with(|epoch| epoch.elapsed().as_millis() as u64)
}
