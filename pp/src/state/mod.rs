//! Session state with actor pattern
//!
//! SessionManager owns one SessionMachine and processes messages via
//! channels, serializing every operation on that session.

mod manager;
mod messages;

pub use manager::{DEFAULT_COMMAND_BUFFER, DEFAULT_EVENT_BUFFER, SessionEvent, SessionManager};
pub use messages::{SessionCommand, SessionError, SessionResponse};
