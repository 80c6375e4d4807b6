mod cleanup;
mod message_router;
mod session_manager;

pub use cleanup::CleanupRequest;
pub use message_router::*;
pub use session_manager::*;
