//! Line source
//!
//! Turns a blocking byte stream into a channel of parsed lines. A background
//! thread owns the blocking read so the consumer can `select!` on the next
//! line alongside its deadline and shutdown signals.

use std::io::{BufRead, ErrorKind};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::Result;
use crate::network::CancelToken;

use super::{CommandLine, TokenMode};

/// Why a line source stopped producing lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// Peer closed the stream (normal termination)
    Eof,

    /// The underlying read failed
    ReadError(String),
}

/// Item produced by a `LineSource`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Line(CommandLine),

    /// Last item before the channel closes
    End(StreamEnd),
}

/// Background line reader
pub struct LineSource {
    events: Receiver<LineEvent>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl LineSource {
    /// Spawn a reader thread over `reader`
    ///
    /// The thread stops after end-of-stream, a read error, cancellation of
    /// `cancel`, or when the consumer drops this source.
    pub fn spawn<R>(reader: R, mode: TokenMode, cancel: CancelToken) -> Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        // Rendezvous: the reader never runs ahead of the consumer
        let (tx, events) = channel::bounded(0);
        let thread_cancel = cancel.clone();

        let handle = thread::Builder::new()
            .name("line-source".to_string())
            .spawn(move || read_lines(reader, mode, tx, thread_cancel))?;

        Ok(Self {
            events,
            cancel,
            handle: Some(handle),
        })
    }

    /// Channel of produced events; disconnected once the reader exits
    pub fn events(&self) -> &Receiver<LineEvent> {
        &self.events
    }

    /// Cancel the reader and wait for its thread to exit
    ///
    /// A reader blocked inside `read` only notices once the read returns, so
    /// the caller must unblock it first (e.g. shut the socket down).
    pub fn close(mut self) {
        self.cancel.cancel();
        self.join();
    }

    fn join(&mut self) {
        // Unblock a pending send before joining
        let (_, closed) = channel::bounded(0);
        drop(std::mem::replace(&mut self.events, closed));

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Line source thread panicked");
            }
        }
    }
}

impl Drop for LineSource {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Iterator for LineSource {
    type Item = LineEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.events.recv().ok()
    }
}

/// Reader thread body
fn read_lines<R: BufRead>(mut reader: R, mode: TokenMode, tx: Sender<LineEvent>, cancel: CancelToken) {
    let mut buf = Vec::new();

    loop {
        if cancel.is_cancelled() {
            tracing::trace!("Line source cancelled");
            return;
        }

        buf.clear();
        let end = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => Some(StreamEnd::Eof),
            Ok(_) => None,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                if cancel.is_cancelled() {
                    return;
                }
                tracing::warn!("Read failed: {}", e);
                Some(StreamEnd::ReadError(e.to_string()))
            }
        };

        let event = match end {
            Some(end) => {
                tracing::trace!("Line source finished: {:?}", end);
                // Consumer may already be gone; nothing left to do either way
                let _ = tx.send(LineEvent::End(end));
                return;
            }
            None => LineEvent::Line(CommandLine::parse(&String::from_utf8_lossy(&buf), mode)),
        };

        if tx.send(event).is_err() {
            return;
        }
    }
}
