//! Journal Recovery
//!
//! Replays the journal on open.

use std::fs::{self, OpenOptions};
use std::path::Path;

use bytes::Buf;

use crate::error::Result;

use super::entry::{FrameHeader, HEADER_SIZE, MAX_BODY_SIZE};
use super::JournalEntry;

/// Result of a recovery pass
#[derive(Debug, Default)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Last valid LSN (0 when the journal is empty)
    pub last_lsn: u64,

    /// Whether a torn or corrupt tail was cut off
    pub was_truncated: bool,
}

/// Handles journal replay after restart
pub struct JournalRecovery;

impl JournalRecovery {
    /// Recover entries from a journal file
    ///
    /// Reads frames in order and stops at the first one that is incomplete,
    /// fails its checksum, or breaks the LSN sequence. Everything from that
    /// point on is truncated so new appends follow the last good entry.
    pub fn recover(path: &Path) -> Result<(Vec<JournalEntry>, RecoveryResult)> {
        let (entries, result, valid_len) = Self::scan(path)?;

        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len as u64)?;
            file.sync_all()?;
        }

        Ok((entries, result))
    }

    /// Verify integrity of a journal file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path).map(|(_, result, _)| result)
    }

    fn scan(path: &Path) -> Result<(Vec<JournalEntry>, RecoveryResult, usize)> {
        let data = fs::read(path)?;
        let mut buf = &data[..];
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();
        let mut valid_len = 0;

        while buf.has_remaining() {
            let header = match FrameHeader::read(&mut buf) {
                Some(h) => h,
                None => {
                    tracing::warn!("Journal has a torn header at offset {}", valid_len);
                    result.was_truncated = true;
                    break;
                }
            };

            if header.len > MAX_BODY_SIZE || buf.remaining() < header.len as usize {
                tracing::warn!("Journal has a torn entry at lsn {}", header.lsn);
                result.was_truncated = true;
                break;
            }
            if header.lsn != result.last_lsn + 1 {
                tracing::warn!(
                    "Journal LSN gap: expected {}, found {}",
                    result.last_lsn + 1,
                    header.lsn
                );
                result.was_truncated = true;
                break;
            }

            let body = &buf[..header.len as usize];
            let entry = match JournalEntry::decode(&header, body) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Dropping journal tail: {}", e);
                    result.was_truncated = true;
                    break;
                }
            };
            buf.advance(header.len as usize);

            valid_len += HEADER_SIZE + header.len as usize;
            result.entries_recovered += 1;
            result.last_lsn = entry.lsn;
            entries.push(entry);
        }

        Ok((entries, result, valid_len))
    }
}
