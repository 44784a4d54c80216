//! **nictl** — small control helpers for the niri compositor.
//!
//! Everything goes through niri's IPC socket (`$NIRI_SOCKET`): one JSON
//! request per connection, plus an event stream for asynchronous
//! notifications.
//!
//! # Architecture
//!
//! * [`niri`] — the IPC stack: [`transport`](niri::transport) frames lines
//!   on the socket, [`protocol`](niri::protocol) performs request/reply round
//!   trips, [`events`](niri::events) subscribes to the event stream, and
//!   [`client`](niri::client) implements [`traits::Compositor`] on top.
//! * [`navigator`] — workspace cycling with wraparound and occupancy skipping.
//! * [`fitter`] — equal-width column fitting with a wait for niri to confirm
//!   the resizes.
//! * [`launcher`] — spawn-or-focus.
//!
//! The algorithms only depend on [`traits::Compositor`], so they are tested
//! against an in-memory double.

pub mod command;
pub mod config;
pub mod error;
pub mod fitter;
pub mod launcher;
pub mod navigator;
pub mod niri;
pub mod traits;

pub use error::NiriError;
