//! Request-scoped execution context
//!
//! Pairs a [`CancellationToken`] with an optional deadline. Contexts form a
//! tree: cancelling a context cancels every context derived from it, while a
//! derived context's own deadline or cancellation never reaches its parent
//! or siblings.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation signal plus optional deadline for one unit of work
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Root context: never cancelled unless [`cancel`](Self::cancel) is called
    pub fn background() -> Self {
        Self::from_token(CancellationToken::new())
    }

    /// Context driven by an externally owned token (e.g. process shutdown)
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a child context that expires after `timeout`
    ///
    /// The child's deadline is the earlier of the parent's deadline and
    /// `now + timeout`. Cancelling the parent cancels the child; cancelling
    /// the child leaves the parent untouched.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let own = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) => parent.min(own),
            None => own,
        };

        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Resolves once the context is cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Resolves once the deadline passes; pending forever when unbounded
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
