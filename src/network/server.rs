//! TCP Server
//!
//! Accepts connections and runs each one as a session on its own thread.

use std::io::{ErrorKind, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::{LineCmdError, Result};
use crate::handler::HandlerRegistry;
use crate::protocol::TOO_MANY_CONNECTIONS;
use crate::store::BackingService;

use super::{CancelToken, Session, SessionScope};

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// TCP server for linecmd
pub struct Server {
    config: Config,

    /// Shared, read-only
    registry: Arc<HandlerRegistry>,

    service: Arc<dyn BackingService>,

    /// Root of every session scope
    shutdown: CancelToken,

    active: Arc<AtomicUsize>,

    next_session_id: AtomicU64,
}

impl Server {
    /// Create a new server with the given config, registry and store
    pub fn new(config: Config, registry: Arc<HandlerRegistry>, service: Arc<dyn BackingService>) -> Self {
        Self {
            config,
            registry,
            service,
            shutdown: CancelToken::new(),
            active: Arc::new(AtomicUsize::new(0)),
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Bind the configured listen address
    pub fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            LineCmdError::Network(format!("Unable to listen on {}: {}", self.config.listen_addr, e))
        })
    }

    /// Bind and serve until shutdown (blocking)
    pub fn run(&self) -> Result<()> {
        let listener = self.bind()?;
        self.serve(listener)
    }

    /// Accept connections on `listener` until shutdown (blocking)
    ///
    /// Accept errors are logged and the loop carries on.
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        // Non-blocking so the loop notices shutdown between connections
        listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        while !self.shutdown.is_cancelled() {
            match listener.accept() {
                Ok((stream, addr)) => self.spawn_session(stream, addr),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    self.shutdown.wait_timeout(ACCEPT_POLL);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::warn!("Failed accepting: {}", e);
                    // e.g. EMFILE: back off instead of spinning
                    self.shutdown.wait_timeout(ACCEPT_POLL);
                }
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    fn spawn_session(&self, mut stream: TcpStream, addr: SocketAddr) {
        let slot = ActiveSlot::acquire(&self.active);
        if slot.previous >= self.config.max_connections {
            tracing::warn!("Refusing {}: {} sessions active", addr, slot.previous);
            if let Err(e) = stream.write_all(TOO_MANY_CONNECTIONS.as_bytes()) {
                tracing::debug!("Refusal notice to {} failed: {}", addr, e);
            }
            return;
        }

        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping {}: {}", addr, e);
            return;
        }
        // Disable Nagle's algorithm for low latency
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {}: {}", addr, e);
        }

        // Deadline runs from acceptance
        let scope = SessionScope::with_timeout(&self.shutdown, self.config.session_timeout());
        let mode = self.config.token_mode;
        let registry = Arc::clone(&self.registry);
        let service = Arc::clone(&self.service);
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);

        tracing::debug!("Accepted {} as session {}", addr, id);

        let spawned = thread::Builder::new()
            .name(format!("session-{}", id))
            .spawn(move || {
                let _slot = slot;
                match Session::new(stream, scope, mode, registry, service) {
                    Ok(session) => {
                        session.run();
                    }
                    Err(e) => tracing::warn!("Failed to start session for {}: {}", addr, e),
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn session thread for {}: {}", addr, e);
        }
    }

    /// Stop accepting and expire every open session
    pub fn shutdown(&self) {
        tracing::info!("Server shutdown requested");
        self.shutdown.cancel();
    }

    /// Token cancelled on shutdown
    pub fn shutdown_token(&self) -> CancelToken {
        self.shutdown.clone()
    }

    /// Number of sessions currently running
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }
}

/// Counts a connection as active until dropped
struct ActiveSlot {
    active: Arc<AtomicUsize>,
    previous: usize,
}

impl ActiveSlot {
    fn acquire(active: &Arc<AtomicUsize>) -> Self {
        let previous = active.fetch_add(1, Ordering::AcqRel);
        Self {
            active: Arc::clone(active),
            previous,
        }
    }
}

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}
