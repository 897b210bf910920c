//! Connection Session
//!
//! Runs the dispatch loop for one client connection.

use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use crossbeam::channel::select;

use crate::error::Result;
use crate::handler::HandlerRegistry;
use crate::protocol::{write_and_flush, CommandLine, LineEvent, LineSource, StreamEnd, TokenMode, CONN_EXPIRED};
use crate::store::BackingService;

use super::SessionScope;

/// Why a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client sent `exit`
    Exit,

    /// Session deadline passed
    Expired,

    /// Server is shutting down
    Shutdown,

    /// Client closed its side of the connection
    PeerClosed,

    /// Reading from the client failed
    ReadFailed(String),
}

/// State of one live connection
///
/// A session is `ACTIVE` from construction until `run` returns; it is
/// consumed by `run`, so there is no way back from `CLOSED`.
pub struct Session {
    /// Kept to shut the socket down on close, which unblocks the reader
    stream: TcpStream,

    writer: BufWriter<TcpStream>,

    lines: LineSource,

    scope: SessionScope,

    registry: Arc<HandlerRegistry>,

    service: Arc<dyn BackingService>,

    /// Peer address for logging
    peer_addr: String,
}

impl Session {
    /// Set up buffered I/O and start the line reader
    pub fn new(
        stream: TcpStream,
        scope: SessionScope,
        mode: TokenMode,
        registry: Arc<HandlerRegistry>,
        service: Arc<dyn BackingService>,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let read_stream = stream.try_clone()?;
        let write_stream = stream.try_clone()?;
        let lines = LineSource::spawn(BufReader::new(read_stream), mode, scope.token().clone())?;

        Ok(Self {
            stream,
            writer: BufWriter::new(write_stream),
            lines,
            scope,
            registry,
            service,
            peer_addr,
        })
    }

    /// Run the dispatch loop to completion
    pub fn run(mut self) -> SessionEnd {
        tracing::debug!(
            "Session with {} started, {:?} until expiry",
            self.peer_addr,
            self.scope.remaining()
        );

        let end = self.dispatch_loop();
        tracing::debug!("Session with {} ended: {:?}", self.peer_addr, end);

        self.close();
        end
    }

    fn dispatch_loop(&mut self) -> SessionEnd {
        let timer = self.scope.timer().clone();
        let cancelled = self.scope.token().signal().clone();
        let events = self.lines.events().clone();

        loop {
            select! {
                recv(timer) -> _ => {
                    write_and_flush(&mut self.writer, CONN_EXPIRED);
                    return SessionEnd::Expired;
                }
                recv(cancelled) -> _ => {
                    write_and_flush(&mut self.writer, CONN_EXPIRED);
                    return SessionEnd::Shutdown;
                }
                recv(events) -> event => match event {
                    Ok(LineEvent::Line(line)) => {
                        if let Some(end) = self.dispatch(line) {
                            return end;
                        }
                    }
                    Ok(LineEvent::End(StreamEnd::ReadError(e))) => return SessionEnd::ReadFailed(e),
                    Ok(LineEvent::End(StreamEnd::Eof)) | Err(_) => return SessionEnd::PeerClosed,
                },
            }
        }
    }

    /// Handle one line; `Some` ends the session
    fn dispatch(&mut self, line: CommandLine) -> Option<SessionEnd> {
        tracing::debug!("Read {:?} from {}", line.command(), self.peer_addr);

        if line.is_exit() {
            return Some(SessionEnd::Exit);
        }

        let response = match self.registry.get(line.command()) {
            Some(handler) => handler(self.service.as_ref(), line.args()),
            None => format!("{}\n", line),
        };
        write_and_flush(&mut self.writer, &response);
        None
    }

    /// Release the socket, the scope and the reader thread
    fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            // Already gone when the peer closed first
            tracing::trace!("Shutdown of {} failed: {}", self.peer_addr, e);
        }
        self.scope.token().cancel();
        self.lines.close();
    }
}
