//! Parallel fan-out with aggregated branch errors
//!
//! [`run_parallel`] runs a set of independent branches concurrently, bounds
//! each one with its own deadline derived from a shared parent
//! [`RequestContext`], waits for every branch to report, and folds all
//! failures into one [`AggregatedError`].
//!
//! Branches never hand values back through the orchestrator. Each branch
//! writes its result into a slot owned by the caller (typically a `&mut`
//! local captured by the branch closure); the borrow checker guarantees the
//! slots are disjoint. The orchestrator only merges errors.
//!
//! Every branch future is owned by the `run_parallel` future and is either
//! driven to completion or dropped before it returns, so no branch work
//! outlives the call.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::context::RequestContext;

type BranchTask<'a> = Box<dyn FnOnce(RequestContext) -> BoxFuture<'a, anyhow::Result<()>> + Send + 'a>;

/// One named unit of concurrent work
///
/// The task receives its own derived context and reports success or an
/// error; any value it produces is written to caller-owned state.
pub struct Branch<'a> {
    name: String,
    task: BranchTask<'a>,
}

impl<'a> Branch<'a> {
    /// Wrap `task` as a branch named `name`
    ///
    /// Branches are polled together on the calling task, so `task` must not
    /// block its thread: a blocking call stalls every sibling and delays its
    /// own timeout until it returns. Move blocking work onto
    /// [`tokio::task::spawn_blocking`] and await the handle.
    pub fn new<F, Fut>(name: impl Into<String>, task: F) -> Self
    where
        F: FnOnce(RequestContext) -> Fut + Send + 'a,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'a,
    {
        Self {
            name: name.into(),
            task: Box::new(move |ctx| Box::pin(task(ctx))),
        }
    }
}

impl fmt::Debug for Branch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch").field("name", &self.name).finish()
    }
}

/// Why a single branch failed
#[derive(Debug, Error)]
pub enum BranchError {
    /// The branch's deadline passed before it finished
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The parent context was cancelled while the branch was running
    #[error("cancelled")]
    Cancelled,

    /// The branch itself returned an error
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl BranchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, BranchError::Timeout(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BranchError::Cancelled)
    }
}

/// A branch failure tagged with the branch name
#[derive(Debug, Error)]
#[error("{branch}: {error}")]
pub struct BranchFailure {
    pub branch: String,
    pub error: BranchError,
}

/// Every failure from one [`run_parallel`] call, in completion order
///
/// Only ever constructed with at least one failure; `Ok(())` from
/// [`run_parallel`] is the sole representation of total success.
#[derive(Debug)]
pub struct AggregatedError {
    failures: Vec<BranchFailure>,
    total: usize,
}

impl AggregatedError {
    pub fn failures(&self) -> &[BranchFailure] {
        &self.failures
    }

    /// Number of failed branches
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of branches that were run
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn failure(&self, branch: &str) -> Option<&BranchFailure> {
        self.failures.iter().find(|f| f.branch == branch)
    }

    pub fn failed_branches(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.branch.as_str()).collect()
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} branches failed", self.failures.len(), self.total)?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregatedError {}

/// Run every branch concurrently and wait for all of them
///
/// Each branch gets a child of `parent` whose deadline is the earlier of the
/// parent's deadline and `per_branch_timeout` from now. A branch that hits
/// its deadline fails with [`BranchError::Timeout`] without affecting its
/// siblings; cancelling `parent` fails every in-flight branch with
/// [`BranchError::Cancelled`].
///
/// There is no short-circuit: the call returns only after every branch has
/// reported. Failures are collected in the order branches finished.
pub async fn run_parallel(
    parent: &RequestContext,
    per_branch_timeout: Duration,
    branches: Vec<Branch<'_>>,
) -> Result<(), AggregatedError> {
    let total = branches.len();

    let mut pending: FuturesUnordered<_> = branches
        .into_iter()
        .map(|branch| {
            let ctx = parent.with_timeout(per_branch_timeout);
            run_branch(branch, ctx)
        })
        .collect();

    let mut failures = Vec::new();
    while let Some(outcome) = pending.next().await {
        if let Err(failure) = outcome {
            warn!(
                branch = %failure.branch,
                error = %failure.error,
                "Branch failed"
            );
            failures.push(failure);
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(AggregatedError { failures, total })
    }
}

async fn run_branch(branch: Branch<'_>, ctx: RequestContext) -> Result<(), BranchFailure> {
    let Branch { name, task } = branch;
    let started = Instant::now();
    let work = task(ctx.clone());

    // A finished result wins over a deadline or cancellation observed in the same poll
    let result = tokio::select! {
        biased;
        res = work => res.map_err(BranchError::Failed),
        _ = ctx.cancelled() => Err(BranchError::Cancelled),
        _ = ctx.expired() => {
            // Only this branch's token; siblings and parent keep running
            ctx.cancel();
            Err(BranchError::Timeout(started.elapsed()))
        }
    };

    match result {
        Ok(()) => {
            debug!(branch = %name, elapsed_ms = started.elapsed().as_millis() as u64, "Branch succeeded");
            Ok(())
        }
        Err(error) => Err(BranchFailure {
            branch: name,
            error,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_branch_set_succeeds() {
        let ctx = RequestContext::background();
        assert!(run_parallel(&ctx, Duration::from_secs(1), Vec::new()).await.is_ok());
    }

    #[tokio::test]
    async fn test_display_lists_every_failure() {
        let ctx = RequestContext::background();
        let branches = vec![
            Branch::new("age", |_ctx| async { Err::<(), _>(anyhow::anyhow!("boom")) }),
            Branch::new("gender", |_ctx| async { anyhow::Ok(()) }),
        ];

        let err = run_parallel(&ctx, Duration::from_secs(1), branches)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "1 of 2 branches failed: age: boom");
        assert_eq!(err.total(), 2);
        assert_eq!(err.failed_branches(), vec!["age"]);
    }

    #[test]
    fn test_branch_error_classification() {
        assert!(BranchError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(BranchError::Cancelled.is_cancelled());
        assert!(!BranchError::Failed(anyhow::anyhow!("x")).is_timeout());
    }
}
