//! Journal entry definitions
//!
//! Defines the on-disk framing of individual journal records.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{LineCmdError, Result};
use crate::store::Operation;

/// Frame header: LSN (8) + CRC (4) + body length (4)
pub const HEADER_SIZE: usize = 16;

/// Upper bound on a single body, guards replay against garbage lengths
pub const MAX_BODY_SIZE: u32 = 1024 * 1024;

/// A single entry in the journal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Log Sequence Number - monotonically increasing, starts at 1
    pub lsn: u64,

    /// The committed operation
    pub operation: Operation,

    /// Timestamp (unix millis) when the entry was written
    pub timestamp: u64,
}

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl JournalEntry {
    pub fn new(lsn: u64, operation: Operation) -> Self {
        Self {
            lsn,
            operation,
            timestamp: crate::store::catalog::now_millis(),
        }
    }

    /// Encode header + body into one frame
    pub fn encode(&self) -> Result<Bytes> {
        let body = bincode::serialize(self)?;
        if body.len() > MAX_BODY_SIZE as usize {
            return Err(LineCmdError::JournalWrite(format!(
                "entry too large: {} bytes (max {})",
                body.len(),
                MAX_BODY_SIZE
            )));
        }

        let mut frame = BytesMut::with_capacity(HEADER_SIZE + body.len());
        frame.put_u64(self.lsn);
        frame.put_u32(crc32fast::hash(&body));
        frame.put_u32(body.len() as u32);
        frame.put_slice(&body);
        Ok(frame.freeze())
    }

    /// Decode and verify a body against its header
    pub fn decode(header: &FrameHeader, body: &[u8]) -> Result<Self> {
        let crc = crc32fast::hash(body);
        if crc != header.crc {
            return Err(LineCmdError::JournalCorruption(format!(
                "CRC mismatch at lsn {}: expected {:08x}, got {:08x}",
                header.lsn, header.crc, crc
            )));
        }

        let entry: JournalEntry = bincode::deserialize(body)?;
        if entry.lsn != header.lsn {
            return Err(LineCmdError::JournalCorruption(format!(
                "LSN mismatch: header {}, body {}",
                header.lsn, entry.lsn
            )));
        }
        Ok(entry)
    }
}

impl FrameHeader {
    /// Read a header from the front of `buf`, if enough bytes remain
    pub fn read(buf: &mut impl Buf) -> Option<Self> {
        if buf.remaining() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            lsn: buf.get_u64(),
            crc: buf.get_u32(),
            len: buf.get_u32(),
        })
    }
}
