//! Message routing, lamp derivation and latest-value state.
//!
//! This crate is the stateful layer between the bus subscription and the
//! client fan-out:
//!
//! ```text
//! bus message ──► MessageRouter::handle(topic, payload)
//!                      │ decode, derive lamp, update HubState
//!                      ▼
//!                 Vec<ClientEvent> ──► broadcast to web clients
//! ```
//!
//! `handle` is deliberately infallible: malformed payloads are logged and
//! dropped without touching state, so one bad message never disrupts the
//! next. All store access happens under a single mutex, one acquisition per
//! message, which keeps the status-triggered lamp correction atomic with
//! respect to concurrent telemetry arrivals.

pub mod derivation;
pub mod router;
pub mod state;

pub use derivation::{derive_lamp_state, DEFAULT_LUMINOSITY_THRESHOLD};
pub use router::{MessageRouter, TopicMap};
pub use state::{ChannelSnapshot, HubState, StateSnapshot};
