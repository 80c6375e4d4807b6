//! Signaling broker for two-party WebRTC calls.
//!
//! Clients connect over a WebSocket and exchange JSON messages of the form
//! `{"type": ..., "callId": ..., "data": ...}`. The broker pairs at most two
//! connections per call id and relays `offer`, `answer` and `ice-candidate`
//! payloads between them without inspecting them. The most recent offer is
//! cached and replayed to whoever joins the call later.

pub mod config;
pub mod connection;
pub mod error;
pub mod room;
pub mod signaling;
pub mod transport;

pub use config::Config;
pub use connection::*;
pub use error::SignalingError;
pub use room::*;
pub use signaling::*;
pub use transport::*;
