//! Network Module
//!
//! TCP server and per-connection sessions.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One thread per session, plus one line-reader thread per session
//! - Each session bound to a fixed deadline derived from the server's
//!   shutdown token

mod cancel;
mod server;
mod session;

pub use cancel::{CancelToken, SessionScope};
pub use server::Server;
pub use session::{Session, SessionEnd};
