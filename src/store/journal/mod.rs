//! Journal Module
//!
//! Durable `BackingService`: every committed operation is appended to an
//! append-only journal before it is applied to the in-memory catalog, and
//! the catalog is rebuilt from the journal on open.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! Data is the bincode-encoded `JournalEntry`; CRC covers Data only.

mod entry;
mod recovery;
mod writer;

pub use entry::{FrameHeader, JournalEntry, HEADER_SIZE};
pub use recovery::{JournalRecovery, RecoveryResult};
pub use writer::{JournalFile, JournalWriter};

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::SyncStrategy;
use crate::error::{LineCmdError, Result};

use super::{BackingService, Catalog, Operation, Record};

/// Catalog and its journal, locked together so that an operation is
/// validated, logged and applied as one unit
struct JournalState {
    catalog: Catalog,
    writer: JournalWriter,
}

/// Journal-backed `BackingService`
pub struct JournalStore {
    state: Mutex<JournalState>,
    path: PathBuf,
    owner: String,
}

impl JournalStore {
    const JOURNAL_FILENAME: &'static str = "journal.log";

    /// Open or create a store in `data_dir`, replaying any existing journal
    pub fn open(data_dir: &Path, sync_strategy: SyncStrategy, owner: impl Into<String>) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(Self::JOURNAL_FILENAME);

        let mut catalog = Catalog::new();
        let mut next_lsn = 1;

        if path.exists() {
            let (entries, result) = JournalRecovery::recover(&path)?;
            for entry in entries {
                let lsn = entry.lsn;
                catalog.apply(entry.operation).map_err(|e| {
                    LineCmdError::JournalCorruption(format!("replay of lsn {} failed: {}", lsn, e))
                })?;
            }
            next_lsn = result.last_lsn + 1;

            tracing::info!(
                "Journal recovery: {} entries recovered, last_lsn={}, truncated={}",
                result.entries_recovered,
                result.last_lsn,
                result.was_truncated
            );
        }

        let writer = JournalWriter::open(&path, sync_strategy, next_lsn)?;

        Ok(Self {
            state: Mutex::new(JournalState { catalog, writer }),
            path,
            owner: owner.into(),
        })
    }

    fn commit(&self, op: Operation) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        state.catalog.validate(&op)?;
        let lsn = state.writer.append(&op)?;
        tracing::trace!("Journaled lsn {}: {:?}", lsn, op);
        state.catalog.apply(op)
    }

    /// Force unsynced entries to disk
    pub fn sync(&self) -> Result<()> {
        self.state.lock().writer.sync()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn journal_path(&self) -> &Path {
        &self.path
    }

    pub fn has_database(&self) -> bool {
        self.state.lock().catalog.has_database()
    }

    pub fn has_table(&self) -> bool {
        self.state.lock().catalog.has_table()
    }

    pub fn owner(&self) -> Option<String> {
        self.state.lock().catalog.owner().map(str::to_string)
    }

    /// Snapshot of the table rows
    pub fn records(&self) -> Vec<Record> {
        self.state.lock().catalog.records().to_vec()
    }
}

impl BackingService for JournalStore {
    fn create_database(&self) -> Result<()> {
        self.commit(Operation::CreateDatabase {
            owner: self.owner.clone(),
        })
    }

    fn drop_database(&self) -> Result<()> {
        self.commit(Operation::DropDatabase)
    }

    fn create_table(&self) -> Result<()> {
        self.commit(Operation::CreateTable)
    }

    fn drop_table(&self) -> Result<()> {
        self.commit(Operation::DropTable)
    }

    fn insert_record(&self, text: &str) -> Result<()> {
        self.commit(Operation::insert(text))
    }
}

impl Drop for JournalStore {
    fn drop(&mut self) {
        if let Err(e) = self.state.get_mut().writer.sync() {
            tracing::warn!("Journal sync on close failed: {}", e);
        }
    }
}
