//! Per-frame coalescing utilities.
//!
//! The embedding surface drives one tick per animation frame. Anything that
//! wants work done on the next tick either raises a [`FrameScheduler`] flag or
//! overwrites a [`Latch`]; the tick consumes each at most once. Both are
//! single-threaded and use interior mutability so they can be shared through
//! an `Rc` without a `RefCell` borrow.

use std::cell::Cell;

/// Dirty flag collapsing any number of requests into one pending frame.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Cell<bool>,
    requests: Cell<u64>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for work on the next frame. Repeated calls before the frame runs are merged.
    pub fn request(&self) {
        self.requests.set(self.requests.get().wrapping_add(1));
        if !self.pending.replace(true) {
            log::trace!("frame scheduled");
        }
    }

    /// Drop any pending request without running it.
    pub fn cancel(&self) {
        self.pending.set(false);
    }

    /// Consume the pending request. Returns true at most once per batch of requests.
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Total requests seen, including merged ones.
    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }
}

/// Latest-value cell. Writers overwrite, the frame tick consumes.
#[derive(Debug)]
pub struct Latch<T: Copy> {
    latest: Cell<Option<T>>,
}

impl<T: Copy> Default for Latch<T> {
    fn default() -> Self {
        Self {
            latest: Cell::new(None),
        }
    }
}

impl<T: Copy> Latch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any unconsumed one. Returns true if the latch was empty.
    pub fn set(&self, value: T) -> bool {
        self.latest.replace(Some(value)).is_none()
    }

    /// Consume the stored value.
    pub fn take(&self) -> Option<T> {
        self.latest.take()
    }

    pub fn peek(&self) -> Option<T> {
        self.latest.get()
    }

    pub fn is_pending(&self) -> bool {
        self.peek().is_some()
    }

    pub fn clear(&self) {
        self.latest.set(None);
    }
}
