//! Replaceable handler indirection.
//!
//! The socket callbacks hold a clone of [`HubHandlers`] and look up the
//! current handler on every message, so the handler can change identity
//! without reconnecting.

use std::cell::RefCell;
use std::rc::Rc;

use super::protocol::HubEvent;

type Handler = Rc<dyn Fn(HubEvent)>;

#[derive(Clone, Default)]
pub struct HubHandlers {
    current: Rc<RefCell<Option<Handler>>>,
}

impl HubHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, handler: impl Fn(HubEvent) + 'static) {
        *self.current.borrow_mut() = Some(Rc::new(handler));
    }

    /// Deregister; later messages are dropped
    pub fn clear(&self) {
        self.current.borrow_mut().take();
    }

    pub fn is_registered(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Deliver to the current handler. Returns false when none is registered.
    pub fn dispatch(&self, event: HubEvent) -> bool {
        // clone out first so the handler may replace itself
        let handler = self.current.borrow().clone();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for HubHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubHandlers")
            .field("registered", &self.is_registered())
            .finish()
    }
}
