//! Session module
//!
//! Per-connection protocol state and the command handler that drives it.
//! Handlers only ever write into the connection's outbound queue; flushing
//! to the socket is the connection engine's job.

mod articles;
mod groups;
mod handler;
mod state;

pub use handler::ProtocolHandler;
pub use state::{Features, Session, SessionState};
