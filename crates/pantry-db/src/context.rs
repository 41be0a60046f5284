//! # Operation Context
//!
//! Cancellation signal plus optional deadline for a single repository call.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    OpContext::run(future)                               │
//! │                                                                         │
//! │   check() ── cancelled? ──► Err(Cancelled)                             │
//! │      │                                                                  │
//! │      ├──── deadline passed? ──► Err(Timeout)                           │
//! │      ▼                                                                  │
//! │   select! {                                                             │
//! │      token.cancelled()   ──► drop future, Err(Cancelled)               │
//! │      sleep_until(deadline) ► drop future, Err(Timeout)                 │
//! │      future             ──► its result                                 │
//! │   }                                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dropping the losing future abandons the work. Callers that must not leave
//! partial writes behind run the future inside a transaction, which rolls
//! back on drop.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{DbError, DbResult};

/// Cancellation and deadline for one operation.
///
/// ## Usage
/// ```rust,ignore
/// let ctx = OpContext::with_timeout(Duration::from_secs(5));
/// repo.update(&ctx, product).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        OpContext::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        OpContext::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        OpContext {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context cancelled through a caller-owned token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        OpContext {
            token,
            deadline: None,
        }
    }

    /// Adds (or tightens) a deadline on this context.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Cancels the context. Every clone observes the cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The token backing this context, for handing to other tasks.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Fails if the context is already cancelled or past its deadline.
    ///
    /// Cancellation wins when both apply.
    pub fn check(&self) -> DbResult<()> {
        if self.token.is_cancelled() {
            return Err(DbError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DbError::Timeout),
            _ => Ok(()),
        }
    }

    /// Runs `fut` until it completes, the context is cancelled, or the
    /// deadline passes, whichever happens first.
    pub async fn run<F, T>(&self, fut: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        self.check()?;

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(DbError::Cancelled),
            _ = expired => Err(DbError::Timeout),
            result = fut => result,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
