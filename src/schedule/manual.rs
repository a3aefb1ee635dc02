use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

use super::{TimerCallback, TimerId, TimerSource};

/// Virtual clock for hosts that drive their own frame loop.
///
/// Time only moves when [`ManualTimers::advance`] is called; due callbacks run
/// in deadline order, ties broken by scheduling order.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    pending: RefCell<BTreeMap<(Duration, TimerId), TimerCallback>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Moves the clock forward, running every callback that falls due.
    /// Callbacks scheduled by a running callback fire too if they fall due.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut fired = 0;
        loop {
            let next = {
                let mut pending = self.pending.borrow_mut();
                match pending.keys().next().copied() {
                    Some(key) if key.0 <= target => pending.remove(&key).map(|cb| (key.0, cb)),
                    _ => None,
                }
            };
            let Some((deadline, callback)) = next else {
                break;
            };
            self.now.set(deadline);
            callback();
            fired += 1;
        }
        self.now.set(target);
        fired
    }

    /// Runs callbacks that are due right now, such as zero-delay deferrals.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }
}

impl TimerSource for ManualTimers {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId::new(self.next_id.get());
        self.next_id.set(id.raw() + 1);
        self.pending
            .borrow_mut()
            .insert((self.now.get() + delay, id), callback);
        id
    }

    fn cancel(&self, id: TimerId) {
        self.pending.borrow_mut().retain(|(_, pending_id), _| *pending_id != id);
    }
}

impl std::fmt::Debug for ManualTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTimers")
            .field("now", &self.now.get())
            .field("pending", &self.pending_count())
            .finish()
    }
}
