//! SketchWire participant client.
//!
//! One participant is a [`Session`] (capture + store + renderer) wired to
//! the relay hub over a [`RelayConnection`]. The session is single-threaded
//! and event-driven; the socket thread only shuttles strings.

pub mod config;
pub mod net;
pub mod session;

pub use config::relay_endpoint;
pub use net::{ConnectionState, NetEvent, RelayConnection};
pub use session::Session;
