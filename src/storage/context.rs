use crate::error::{QueryError, QueryResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline for one logical request. Clones share the same token, so
/// cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context cancelled along with this one, optionally with a tighter deadline.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let deadline = match (self.deadline, timeout) {
            (Some(d), Some(t)) => Some(d.min(Instant::now() + t)),
            (None, Some(t)) => Some(Instant::now() + t),
            (d, None) => d,
        };
        Self {
            token: self.token.child_token(),
            deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the reason the context is done, if it is.
    pub fn err(&self) -> Option<QueryError> {
        if self.token.is_cancelled() {
            return Some(QueryError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(QueryError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> QueryError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => QueryError::Canceled,
                    _ = tokio::time::sleep_until(deadline) => QueryError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                QueryError::Canceled
            }
        }
    }

    /// Runs `fut` unless the context finishes first.
    pub async fn run<T, F>(&self, fut: F) -> QueryResult<T>
    where
        F: Future<Output = QueryResult<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            res = fut => res,
            err = self.done() => Err(err),
        }
    }
}
