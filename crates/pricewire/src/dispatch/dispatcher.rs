//! Event dispatcher with a fixed, enum-keyed routing table.

use std::sync::Arc;

use log::debug;
use pricewire_protocol::{Event, EventKind};
use thiserror::Error;

use super::handler::EventHandler;

/// Error surfaced by [`EventDispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No handler is registered for the event's kind. Fatal to this dispatch
    /// call only.
    #[error("no handler registered for event kind '{0}'")]
    NoHandlerForKind(EventKind),

    /// A handler failed; the error propagates to whoever invoked dispatch.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

/// Routes events to the handlers registered for their kind.
///
/// The routing table is a fixed-size array indexed by [`EventKind::index`],
/// each slot holding an ordered handler list. It is populated exactly once in
/// [`EventDispatcher::new`] and never mutated afterwards.
pub struct EventDispatcher {
    routes: [Vec<Arc<dyn EventHandler>>; EventKind::COUNT],
}

impl EventDispatcher {
    /// Build the routing table.
    ///
    /// For each handler, for each kind it declares, the handler is appended
    /// to that kind's list, so invocation order is the order handlers are
    /// passed in, then the order of their declared kinds.
    pub fn new(handlers: impl IntoIterator<Item = Arc<dyn EventHandler>>) -> Self {
        let mut routes: [Vec<Arc<dyn EventHandler>>; EventKind::COUNT] =
            std::array::from_fn(|_| Vec::new());

        for handler in handlers {
            for kind in handler.kinds() {
                routes[kind.index()].push(handler.clone());
            }
        }

        Self { routes }
    }

    /// Invoke every handler registered for the event's kind, in registration
    /// order, passing the same event instance to each.
    pub async fn dispatch(&self, event: &Event) -> Result<(), DispatchError> {
        let kind = event.kind();
        let handlers = &self.routes[kind.index()];

        if handlers.is_empty() {
            return Err(DispatchError::NoHandlerForKind(kind));
        }

        debug!("dispatching {} to {} handler(s)", kind, handlers.len());

        for handler in handlers {
            handler.handle(event).await?;
        }

        Ok(())
    }
}
