//! Execution context shared by retry loops and locator waits

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cooperative cancellation and deadline for one logical action.
///
/// Cloning shares the token. [`ExecCtx::child`] derives a context that is
/// cancelled with its parent but can be cancelled on its own.
#[derive(Debug, Clone)]
pub struct ExecCtx {
    /// Cancellation token for cooperative cancellation
    pub cancel_token: CancellationToken,

    /// Optional deadline for this operation
    pub deadline: Option<Instant>,

    /// Unique identifier for tracing and correlation
    pub action_id: String,
}

impl Default for ExecCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecCtx {
    /// Context without a deadline.
    pub fn new() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            deadline: None,
            action_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Derived context with a fresh action id and child token.
    ///
    /// The child keeps the tighter of the two deadlines.
    pub fn child(&self, timeout: Option<Duration>) -> Self {
        let own = timeout.map(|t| Instant::now() + t);
        let deadline = match (self.deadline, own) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        Self {
            cancel_token: self.cancel_token.child_token(),
            deadline,
            action_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn is_timeout(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Time left before the deadline; `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Clamp `timeout` to the remaining time.
    pub fn bound(&self, timeout: Duration) -> Duration {
        self.remaining().map_or(timeout, |left| left.min(timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_and_remaining() {
        let ctx = ExecCtx::with_timeout(Duration::from_millis(500));
        assert!(!ctx.is_timeout());
        assert_eq!(ctx.bound(Duration::from_secs(5)), Duration::from_millis(500));

        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(ctx.is_timeout());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn test_child_inherits_cancellation() {
        let parent = ExecCtx::new();
        let child = parent.child(Some(Duration::from_secs(1)));
        assert_ne!(parent.action_id, child.action_id);
        assert!(child.deadline.is_some());

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn test_child_cancel_does_not_reach_parent() {
        let parent = ExecCtx::new();
        let child = parent.child(None);
        child.cancel();
        assert!(!parent.is_cancelled());
        assert!(parent.remaining().is_none());
    }
}
