mod call;
mod connection;
mod signaling;

pub use call::CallId;
pub use connection::ConnectionId;
pub use signaling::{MessageType, RawMessage, SignalMessage};
