//! Queue of `ClientEvent`s between the client core and the views.
//!
//! Session changes, login redirects, loaded courses, chat frames and toast
//! notices are pushed here from async tasks and socket callbacks. `ClientApp`
//! drains the queue at the top of every egui frame, so events reach
//! `UiState` in the order they were emitted.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use elearn_types::event::ClientEvent;

/// Every clone appends to and drains the same queue.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<ClientEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Publish an event. Called by the session manager, API client and chat view.
    pub fn emit(&self, event: ClientEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    /// Take everything emitted since the previous frame.
    pub fn drain(&self) -> Vec<ClientEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    /// True while events are waiting for the next frame
    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
