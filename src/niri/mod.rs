//! niri-specific implementations.
//!
//! This module provides the IPC stack (transport, request/reply protocol and
//! event stream) and the concrete [`Compositor`](crate::traits::Compositor)
//! backend built on it.
//!
//! Nothing outside this module should touch the socket directly.

pub mod client;
pub mod events;
pub mod protocol;
pub mod transport;
pub mod types;
