use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use gtk4::glib::SourceId;

use super::{TimerCallback, TimerId, TimerSource};

/// Timers on the thread-default glib main context.
#[derive(Default)]
pub struct GlibTimers {
    next_id: Cell<u64>,
    sources: Rc<RefCell<HashMap<TimerId, SourceId>>>,
}

impl GlibTimers {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerSource for GlibTimers {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerId {
        let id = TimerId::new(self.next_id.get());
        self.next_id.set(id.raw() + 1);

        let sources = Rc::downgrade(&self.sources);
        let source = gtk4::glib::timeout_add_local_once(delay, move || {
            // The source is finished once this runs; removing it again would panic.
            if let Some(sources) = sources.upgrade() {
                sources.borrow_mut().remove(&id);
            }
            callback();
        });
        self.sources.borrow_mut().insert(id, source);
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(source) = self.sources.borrow_mut().remove(&id) {
            source.remove();
        }
    }
}

impl Drop for GlibTimers {
    fn drop(&mut self) {
        for (_, source) in self.sources.borrow_mut().drain() {
            source.remove();
        }
    }
}

impl std::fmt::Debug for GlibTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlibTimers")
            .field("pending", &self.sources.borrow().len())
            .finish()
    }
}
