//! # linecmd
//!
//! A line-oriented TCP command server with:
//! - Newline-terminated, case-insensitive text commands
//! - A fixed deadline per connection, announced to the client on expiry
//! - An immutable registry of command handlers
//! - A pluggable backing store (in-memory or journaled)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (one session per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Session                                 │
//! │        select! { deadline, shutdown, next line }             │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌─────────────────┐                ┌─────────────────┐
//!   │   Line Source   │                │ Handler Registry│
//!   │ (reader thread) │                │   (read-only)   │
//!   └─────────────────┘                └────────┬────────┘
//!                                               │
//!                                               ▼
//!                                      ┌─────────────────┐
//!                                      │ Backing Service │
//!                                      │ (memory/journal)│
//!                                      └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod handler;
pub mod store;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LineCmdError, Result};
pub use config::Config;
pub use handler::HandlerRegistry;
pub use network::Server;
pub use store::BackingService;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of linecmd
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
