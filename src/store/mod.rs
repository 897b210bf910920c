//! Store Module
//!
//! The backing data service consumed by command handlers.
//!
//! ## Responsibilities
//! - Define the `BackingService` capability set
//! - Keep every operation atomic: callers on different sessions never see
//!   a half-applied operation
//!
//! ## Implementations
//! - `MemoryStore`: catalog in memory, gone on restart
//! - `JournalStore`: catalog rebuilt from an append-only journal

pub mod catalog;
mod journal;
mod memory;

pub use catalog::{Catalog, Operation, Record, DATABASE_NAME, MAX_TEXT_LEN, TABLE_NAME};
pub use journal::{
    FrameHeader, JournalEntry, JournalFile, JournalRecovery, JournalStore, JournalWriter, RecoveryResult,
    HEADER_SIZE,
};
pub use memory::MemoryStore;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;

/// Capabilities a store offers to handlers
///
/// Shared by every session, so implementations must be safe to call
/// concurrently and must make each call independently atomic.
pub trait BackingService: Send + Sync {
    fn create_database(&self) -> Result<()>;

    fn drop_database(&self) -> Result<()>;

    fn create_table(&self) -> Result<()>;

    fn drop_table(&self) -> Result<()>;

    /// Insert one row holding `text`
    fn insert_record(&self, text: &str) -> Result<()>;
}

/// Open the store selected by `config`
///
/// With a `data_dir` the durable journal store is used, otherwise an
/// in-memory one.
pub fn open_store(config: &Config) -> Result<Arc<dyn BackingService>> {
    match &config.data_dir {
        Some(dir) => {
            let store = JournalStore::open(dir, config.sync_strategy, config.owner.clone())?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::with_owner(config.owner.clone()))),
    }
}
