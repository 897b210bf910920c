//! Configuration for linecmd
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::TokenMode;

/// Main configuration for a linecmd server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client sessions
    pub max_connections: usize,

    /// Lifetime of a session from accept (milliseconds), never renewed
    pub session_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// How a request line is split into command and argument tokens
    pub token_mode: TokenMode,

    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Journal directory. `None` keeps everything in memory.
    /// Internal structure:
    ///   {data_dir}/
    ///     └── journal.log
    pub data_dir: Option<PathBuf>,

    /// Sync strategy: how often to fsync the journal
    pub sync_strategy: SyncStrategy,

    /// Owner recorded when the database is created
    pub owner: String,
}

/// Journal sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:10000".to_string(),
            max_connections: 1024,
            session_timeout_ms: 10_000,
            token_mode: TokenMode::default(),
            data_dir: None,
            sync_strategy: SyncStrategy::EveryWrite,
            owner: "linecmd".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Session lifetime as a `Duration`
    pub fn session_timeout(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent sessions
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the session timeout (in milliseconds)
    pub fn session_timeout_ms(mut self, ms: u64) -> Self {
        self.config.session_timeout_ms = ms;
        self
    }

    /// Set how request lines are tokenized
    pub fn token_mode(mut self, mode: TokenMode) -> Self {
        self.config.token_mode = mode;
        self
    }

    /// Set the journal directory (enables the durable store)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = Some(path.into());
        self
    }

    /// Set the journal sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the database owner
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.config.owner = owner.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
