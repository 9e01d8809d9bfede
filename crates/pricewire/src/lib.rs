//! Pricewire server library.
//!
//! Routes typed market events through a type-keyed dispatcher and fans the
//! results out over a public WebSocket price feed and per-user authenticated
//! notification channels.

pub mod api;
pub mod auth;
pub mod dispatch;
pub mod handlers;
pub mod realtime;
pub mod relay;
pub mod settings;
