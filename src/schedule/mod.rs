//! Deferred callbacks on the UI thread.
//!
//! Everything runs on one event loop; the only suspension points are timers
//! armed through a [`TimerSource`].

mod debounce;
mod main_loop;
mod manual;

use std::time::Duration;

pub use debounce::Debouncer;
pub use main_loop::GlibTimers;
pub use manual::ManualTimers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub type TimerCallback = Box<dyn FnOnce()>;

/// One-shot timers on the current thread's event loop.
pub trait TimerSource {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId;
    /// Cancelling a timer that already fired or was cancelled is a no-op.
    fn cancel(&self, id: TimerId);
}
