//! Per-invocation call context: caller deadline and cancellation signal.
//!
//! A [`CancelHandle`] is held by whoever may abort the invocation (the protocol
//! server, on a cancellation notification). The paired [`CancelSignal`] travels
//! inside the [`CallContext`] into the dispatcher, which races it against the
//! outbound HTTP call.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Creates a connected cancel handle and signal.
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), CancelSignal(rx))
}

/// Fires the cancellation of one invocation.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Observes the cancellation of one invocation.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        // Dropping the sender means the value can never change to `true`.
        drop(tx);
        Self(rx)
    }

    /// Returns `true` if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancellation is requested.
    ///
    /// Never resolves if the handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        let handle_dropped = self.0.wait_for(|cancelled| *cancelled).await.is_err();
        if handle_dropped {
            std::future::pending::<()>().await;
        }
    }
}

/// Everything the caller of an invocation can say about how long it may run.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: CancelSignal,
}

impl CallContext {
    /// A context with no deadline that is never cancelled.
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancel: CancelSignal::never(),
        }
    }

    /// A context observing `cancel`, with no deadline.
    pub fn with_cancel(cancel: CancelSignal) -> Self {
        Self {
            deadline: None,
            cancel,
        }
    }

    /// Returns a copy of this context that must finish within `timeout` from now.
    ///
    /// An existing earlier deadline is kept.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < candidate => existing,
            _ => candidate,
        });
        self
    }

    /// The caller's deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}
