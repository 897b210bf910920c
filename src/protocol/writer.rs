//! Response writer
//!
//! Delivers a whole response string to the peer in one write-and-flush unit.

use std::io::{BufWriter, ErrorKind, Write};

/// Write `data` and flush immediately
///
/// Best effort: a short write or a failed flush is logged, never returned,
/// and the caller carries on.
pub fn write_and_flush<W: Write>(writer: &mut BufWriter<W>, data: &str) {
    let bytes = data.as_bytes();
    let mut written = 0;
    let mut failure = None;

    while written < bytes.len() {
        match writer.write(&bytes[written..]) {
            Ok(0) => break,
            Ok(n) => written += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    if written != bytes.len() {
        match failure {
            Some(e) => tracing::warn!("Unable to write data ({} of {} bytes): {}", written, bytes.len(), e),
            None => tracing::warn!("Unable to write data ({} of {} bytes)", written, bytes.len()),
        }
    }

    if let Err(e) = writer.flush() {
        tracing::warn!("Flush failed: {}", e);
    }
}
