//! Cancellation scopes
//!
//! A `CancelToken` is a cloneable, one-shot signal. Its `signal()` receiver
//! never carries a message; it disconnects when the token is cancelled, so it
//! can sit in a `crossbeam::channel::select!` next to data channels.
//!
//! Tokens form a tree: cancelling a parent cancels every child derived from
//! it, never the other way round. The server owns the root (shutdown) and
//! every session derives a `SessionScope` from it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

/// One-shot cancellation signal shared between threads
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,

    /// Dropped on cancel, which disconnects `signal`
    trigger: Mutex<Option<Sender<()>>>,

    signal: Receiver<()>,

    children: Mutex<Vec<Weak<Inner>>>,
}

impl Inner {
    fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.trigger.lock().take();

        let children = std::mem::take(&mut *self.children.lock());
        for child in children.iter().filter_map(Weak::upgrade) {
            child.cancel();
        }
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Derive a token that is cancelled together with this one
    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        {
            let mut children = self.inner.children.lock();
            children.retain(|c| c.strong_count() > 0);
            children.push(Arc::downgrade(&child.inner));
        }
        // Parent may have been cancelled while we registered
        if self.is_cancelled() {
            child.cancel();
        }
        child
    }

    /// Cancel this token and all of its children. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready (disconnected) once cancelled
    pub fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }

    /// Block until cancelled or until `timeout` elapses.
    /// Returns true if the token was cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.inner.signal.recv_timeout(timeout) {
            Err(channel::RecvTimeoutError::Timeout) => self.is_cancelled(),
            _ => true,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Deadline-bound cancellation scope for one session
///
/// The deadline is fixed when the scope is created and is never extended.
/// Dropping the scope cancels its token, releasing anything bound to it.
pub struct SessionScope {
    token: CancelToken,
    deadline: Instant,
    timer: Receiver<Instant>,
}

impl SessionScope {
    /// Derive a scope from `parent` that expires after `timeout`
    pub fn with_timeout(parent: &CancelToken, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            token: parent.child(),
            deadline,
            timer: channel::at(deadline),
        }
    }

    /// Token cancelled on parent cancellation or when the scope is released
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Receiver that yields once when the deadline passes
    pub fn timer(&self) -> &Receiver<Instant> {
        &self.timer
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
