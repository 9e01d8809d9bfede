//! Canonical protocol types for pricewire.
//!
//! This crate defines the inbound event envelope, the server-to-client
//! WebSocket frames, and the payload shapes shared between the server and
//! external consumers. It carries no I/O, just types and validation.

mod event;
mod wire;

pub use event::{
    AlertDirection, Event, EventKind, InvalidEventError, NotificationIntent, PriceQuote,
    PriceRecord,
};
pub use wire::{Currency, FeedChannel, PriceUpdate, RelayUpdate, ServerFrame, UserNotice};
