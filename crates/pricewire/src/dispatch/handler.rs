//! Event handler contract.

use async_trait::async_trait;
use pricewire_protocol::{Event, EventKind};

/// A unit of domain logic invoked for the event kinds it declares.
///
/// Handlers are registered once at startup and shared across concurrent
/// dispatch calls, so implementations must be `Send + Sync`. A handler's own
/// failure policy is its responsibility; an error returned here aborts the
/// dispatch call that triggered it.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Event kinds this handler accepts.
    fn kinds(&self) -> &'static [EventKind];

    /// Process one event. The same event instance is passed to every handler
    /// registered for its kind.
    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}
