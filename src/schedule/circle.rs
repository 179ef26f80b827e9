//! Circle - per-event-type scheduling unit
//!
//! A circle batches any number of throttled entries behind a single native
//! event binding. Each entry is an (interval, read, write) triple: on every
//! notification the circle runs the reads whose interval has elapsed, then
//! delivers each result to its write. Reads are phase-separated from writes
//! so all due entries observe state from the same instant.
//!
//! Entries may be registered and unregistered freely while a dispatch is in
//! flight, including from inside their own write. Dispatch snapshots the due
//! entries up front and re-checks liveness before every read and write, so a
//! removed entry never fires after its removal.
//!
//! # Example
//!
//! ```ignore
//! use viewport_events::schedule::{Circle, Entry, EntryMeta, Hooks};
//!
//! let circle: Circle<u32> = Circle::new(Hooks::noop());
//! let id = circle.register(Entry {
//!     meta: EntryMeta { interval: 50 },
//!     read: Box::new(|| 7),
//!     write: Some(Box::new(|value| println!("{value}"))),
//! });
//!
//! circle.notify(); // runs the read, delivers 7 to the write
//! circle.unregister(id);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::clock::now_ms;

// =============================================================================
// TYPES
// =============================================================================

/// Notification callback handed to the listen/unlisten hooks.
///
/// The event source invokes it with the current monotonic time in ms.
pub type Notify = Rc<dyn Fn(u64)>;

/// Native-binding hooks for a circle.
///
/// `listen` is called once with the circle's notify when the first entry is
/// registered; `unlisten` receives the same `Rc` on [`Circle::unbind`].
pub struct Hooks {
    pub listen: Box<dyn Fn(&Notify)>,
    pub unlisten: Box<dyn Fn(&Notify)>,
}

impl Hooks {
    /// Hooks that bind to nothing (for tests and manually-driven circles).
    pub fn noop() -> Self {
        Self {
            listen: Box::new(|_| {}),
            unlisten: Box::new(|_| {}),
        }
    }
}

/// Opaque identifier for a registered entry.
///
/// Unique within the owning circle and never reused for a live entry (ids
/// are assigned from a monotonic counter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

/// Scheduling metadata for an entry.
#[derive(Clone, Copy, Debug)]
pub struct EntryMeta {
    /// Minimum milliseconds between successive runs. 0 = every notification.
    pub interval: u64,
}

/// A read/write pair registered with a circle.
///
/// `read` produces a value; `write` (optional) consumes it. Entries whose
/// only job is to refresh shared state register without a write.
pub struct Entry<T> {
    pub meta: EntryMeta,
    pub read: Box<dyn Fn() -> T>,
    pub write: Option<Box<dyn Fn(&T)>>,
}

struct Registered<T> {
    id: EntryId,
    interval: u64,
    last_run: Cell<Option<u64>>,
    read: Box<dyn Fn() -> T>,
    write: Option<Box<dyn Fn(&T)>>,
}

impl<T> Registered<T> {
    fn due(&self, now: u64) -> bool {
        match self.last_run.get() {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }
}

struct Inner<T> {
    entries: Vec<Rc<Registered<T>>>,
    next_id: u64,
    bound: Option<Notify>,
}

// =============================================================================
// Circle
// =============================================================================

/// Per-event-type scheduling unit. See the module docs.
pub struct Circle<T> {
    inner: Rc<RefCell<Inner<T>>>,
    hooks: Hooks,
}

impl<T: 'static> Circle<T> {
    pub fn new(hooks: Hooks) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: Vec::new(),
                next_id: 0,
                bound: None,
            })),
            hooks,
        }
    }

    /// Register an entry and return its id.
    ///
    /// The first registration binds the circle to its native event via the
    /// `listen` hook. Entries registered from inside a write do not fire
    /// until the next notification.
    pub fn register(&self, entry: Entry<T>) -> EntryId {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = EntryId(inner.next_id);
            inner.next_id += 1;
            inner.entries.push(Rc::new(Registered {
                id,
                interval: entry.meta.interval,
                last_run: Cell::new(None),
                read: entry.read,
                write: entry.write,
            }));
            id
        };

        self.bind();
        id
    }

    /// Remove an entry. Unknown ids are a silent no-op.
    ///
    /// Safe to call mid-dispatch, including from the entry's own write; the
    /// entry will not fire again afterwards. The native binding is kept even
    /// when the last entry is removed (see [`Circle::unbind`]).
    pub fn unregister(&self, id: EntryId) {
        self.inner.borrow_mut().entries.retain(|e| e.id != id);
    }

    /// Whether an entry with this id is currently registered.
    pub fn contains(&self, id: EntryId) -> bool {
        self.inner.borrow().entries.iter().any(|e| e.id == id)
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Run a dispatch tick stamped with the monotonic clock.
    pub fn notify(&self) {
        self.notify_at(now_ms());
    }

    /// Run a dispatch tick at an explicit timestamp (ms).
    ///
    /// Entries run when they have never run before or when `now` is at least
    /// `interval` past their last run.
    pub fn notify_at(&self, now: u64) {
        dispatch(&self.inner, now);
    }

    /// Detach the native binding, if bound.
    ///
    /// Registered entries stay in place and manual `notify_at` still works;
    /// a subsequent `register` re-binds.
    pub fn unbind(&self) {
        let bound = self.inner.borrow_mut().bound.take();
        if let Some(notify) = bound {
            (self.hooks.unlisten)(&notify);
        }
    }

    fn bind(&self) {
        if self.inner.borrow().bound.is_some() {
            return;
        }

        let weak = Rc::downgrade(&self.inner);
        let notify: Notify = Rc::new(move |now| {
            if let Some(inner) = weak.upgrade() {
                dispatch(&inner, now);
            }
        });

        (self.hooks.listen)(&notify);
        self.inner.borrow_mut().bound = Some(notify);
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// One dispatch tick over a circle's entries.
///
/// No borrow is held while user code (reads, writes) runs, so entries can
/// register, unregister, or re-notify from inside their callbacks without
/// tripping the `RefCell`.
fn dispatch<T>(inner: &Rc<RefCell<Inner<T>>>, now: u64) {
    let due: Vec<Rc<Registered<T>>> = inner
        .borrow()
        .entries
        .iter()
        .filter(|e| e.due(now))
        .cloned()
        .collect();

    if due.is_empty() {
        return;
    }

    let alive = |id: EntryId| inner.borrow().entries.iter().any(|e| e.id == id);

    // Read phase: all due reads run before any write, in registration order.
    let mut outputs: Vec<(Rc<Registered<T>>, T)> = Vec::with_capacity(due.len());
    for entry in due {
        if !alive(entry.id) {
            continue;
        }
        entry.last_run.set(Some(now));
        let value = (entry.read)();
        outputs.push((entry, value));
    }

    // Write phase. A write that unregisters a later entry suppresses that
    // entry's delivery for this tick.
    for (entry, value) in outputs {
        if !alive(entry.id) {
            continue;
        }
        if let Some(write) = &entry.write {
            write(&value);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
