//! Type-keyed event dispatch.
//!
//! Handlers declare the event kinds they accept; the dispatcher routes each
//! incoming event to every handler registered for its kind, in registration
//! order. The routing table is built once at startup and is read-only
//! afterwards, so concurrent dispatch needs no locking.

mod dispatcher;
mod handler;

pub use dispatcher::{DispatchError, EventDispatcher};
pub use handler::EventHandler;
