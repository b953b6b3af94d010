use std::{future, sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{self, Instant},
};

/// Why a request scope stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Cancelled,
    DeadlineExceeded,
}

/// Cancellation signal and optional deadline a caller passes with every
/// store request.
///
/// Clones share the same cancellation flag, so cancelling any clone (or the
/// parent of a child scope) interrupts every call waiting on it.
#[derive(Debug, Clone)]
pub struct RequestScope {
    cancelled: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
}

impl RequestScope {
    /// A scope that is never cancelled and never expires.
    pub fn background() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(cancelled),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().child_with_timeout(timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::background()
        }
    }

    /// Derive a scope that shares this one's cancellation and expires after
    /// `timeout` or at the parent's deadline, whichever comes first.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// The reason this scope is already interrupted, if it is.
    pub fn interrupted(&self) -> Option<Interrupted> {
        if self.is_cancelled() {
            Some(Interrupted::Cancelled)
        } else if self.deadline.is_some_and(|d| d <= Instant::now()) {
            Some(Interrupted::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Wait until the scope is cancelled or its deadline passes.
    /// Cancellation wins when both have already happened.
    pub async fn done(&self) -> Interrupted {
        // A deadline already in the past must not wait for the timer wheel.
        if let Some(reason) = self.interrupted() {
            return reason;
        }

        let mut cancelled = self.cancelled.subscribe();
        let expired = async {
            match self.deadline {
                Some(deadline) => time::sleep_until(deadline).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled.wait_for(|c| *c) => Interrupted::Cancelled,
            _ = expired => Interrupted::DeadlineExceeded,
        }
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::background()
    }
}
