use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use super::{TimerId, TimerSource};

#[derive(Debug, Default)]
struct DebounceState {
    pending: Cell<Option<TimerId>>,
    /// Bumped on every arm and cancel; a firing timer whose generation is stale does nothing.
    generation: Cell<u64>,
    torn_down: Cell<bool>,
}

/// Cancel-then-arm coalescing: at most one scheduled action is live.
pub struct Debouncer {
    timers: Rc<dyn TimerSource>,
    state: Rc<DebounceState>,
}

impl Debouncer {
    pub fn new(timers: Rc<dyn TimerSource>) -> Self {
        Self {
            timers,
            state: Rc::new(DebounceState::default()),
        }
    }

    /// Supersedes any pending action and runs `action` once after `delay` of quiet.
    pub fn schedule(&self, delay: Duration, action: impl FnOnce() + 'static) {
        if self.state.torn_down.get() {
            return;
        }
        self.cancel();

        let generation = self.state.generation.get();
        let state = Rc::downgrade(&self.state);
        let id = self.timers.schedule(
            delay,
            Box::new(move || {
                let Some(state) = state.upgrade() else {
                    return;
                };
                if state.torn_down.get() || state.generation.get() != generation {
                    return;
                }
                state.pending.set(None);
                action();
            }),
        );
        self.state.pending.set(Some(id));
    }

    pub fn cancel(&self) {
        self.state
            .generation
            .set(self.state.generation.get().wrapping_add(1));
        if let Some(id) = self.state.pending.take() {
            self.timers.cancel(id);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get().is_some()
    }

    /// Cancels and refuses further scheduling.
    pub fn teardown(&self) {
        self.cancel();
        self.state.torn_down.set(true);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("pending", &self.is_pending())
            .field("torn_down", &self.state.torn_down.get())
            .finish()
    }
}
