//! Journal Writer
//!
//! Handles appending entries to the journal file.
//!
//! An append either lands completely or leaves the file as it was: a frame
//! whose write or sync fails is cut back off before the error is returned,
//! so a failed operation can never be replayed and the next LSN stays free.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::config::SyncStrategy;
use crate::error::{LineCmdError, Result};
use crate::store::Operation;

use super::JournalEntry;

/// File operations the writer needs beyond `Write`
pub trait JournalFile: Write + Send {
    /// Current length in bytes
    fn current_len(&self) -> io::Result<u64>;

    /// Cut the file back to `len` bytes; later writes append after it
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;

    /// Flush file data to stable storage
    fn sync_to_disk(&mut self) -> io::Result<()>;
}

impl JournalFile for File {
    fn current_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        // Opened in append mode: the next write goes to the new end
        self.set_len(len)
    }

    fn sync_to_disk(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }
}

/// Appends entries to the journal file
pub struct JournalWriter<F: JournalFile = File> {
    file: F,

    /// Bytes of complete frames in the file
    len: u64,

    next_lsn: u64,
    sync_strategy: SyncStrategy,
    unsynced: usize,

    /// Set when a failed append could not be rolled back
    broken: Option<String>,
}

impl JournalWriter<File> {
    /// Open (or create) a journal for appending, continuing at `next_lsn`
    pub fn open(path: &Path, sync_strategy: SyncStrategy, next_lsn: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::from_file(file, sync_strategy, next_lsn)
    }
}

impl<F: JournalFile> JournalWriter<F> {
    /// Wrap an already opened append-mode file
    pub fn from_file(file: F, sync_strategy: SyncStrategy, next_lsn: u64) -> Result<Self> {
        let len = file.current_len()?;
        Ok(Self {
            file,
            len,
            next_lsn,
            sync_strategy,
            unsynced: 0,
            broken: None,
        })
    }

    /// Append an operation, returning its LSN
    ///
    /// On error nothing of the entry remains in the file.
    pub fn append(&mut self, operation: &Operation) -> Result<u64> {
        if let Some(reason) = &self.broken {
            return Err(LineCmdError::JournalWrite(format!("journal unusable: {}", reason)));
        }

        let lsn = self.next_lsn;
        let frame = JournalEntry::new(lsn, operation.clone()).encode()?;

        let due = match self.sync_strategy {
            SyncStrategy::EveryWrite => true,
            SyncStrategy::EveryNEntries { count } => self.unsynced + 1 >= count,
        };

        let written = self
            .file
            .write_all(&frame)
            .and_then(|_| self.file.flush())
            .and_then(|_| if due { self.file.sync_to_disk() } else { Ok(()) });

        if let Err(e) = written {
            self.roll_back(lsn);
            return Err(LineCmdError::JournalWrite(format!("append lsn {}: {}", lsn, e)));
        }

        self.len += frame.len() as u64;
        self.next_lsn += 1;
        self.unsynced = if due { 0 } else { self.unsynced + 1 };

        Ok(lsn)
    }

    fn roll_back(&mut self, lsn: u64) {
        match self.file.truncate_to(self.len) {
            Ok(()) => tracing::warn!("Rolled back journal entry {} to {} bytes", lsn, self.len),
            Err(e) => {
                tracing::error!("Journal rollback of lsn {} failed: {}", lsn, e);
                self.broken = Some(format!("rollback of lsn {} failed: {}", lsn, e));
            }
        }
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_to_disk()?;
        self.unsynced = 0;
        Ok(())
    }

    /// LSN the next append will get
    pub fn next_lsn(&self) -> u64 {
        self.next_lsn
    }
}
