//! Protocol Module
//!
//! Defines the line-based text protocol between clients and the server.
//!
//! ## Request Format
//! ```text
//! command[:arg1[:arg2...]]\n
//! ```
//! Lines are trimmed and lower-cased before they are split, so commands are
//! case-insensitive. With `TokenMode::Whole` the entire line is the command.
//!
//! ## Response Format
//! Free-form text written by the handler, or the normalized request echoed
//! back when no handler matches. When a session's deadline passes the server
//! sends, unsolicited:
//! ```text
//! Connection has expired\n
//! ```

mod line;
mod source;
mod writer;

pub use line::{CommandLine, TokenMode, EXIT_COMMAND};
pub use source::{LineEvent, LineSource, StreamEnd};
pub use writer::write_and_flush;

/// Notice sent when a session's deadline passes
pub const CONN_EXPIRED: &str = "Connection has expired\n";

/// Notice sent to connections refused over the session limit
pub const TOO_MANY_CONNECTIONS: &str = "Too many connections\n";
