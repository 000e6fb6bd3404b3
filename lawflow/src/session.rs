//! Evaluation session - publishes only the newest evaluation result.
//!
//! Evaluations may overlap when the snapshot changes while one is in flight.
//! Every evaluation takes a monotonically increasing token; a completion is
//! published only if its token is still the latest issued, so a slow older
//! evaluation cannot overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use lawbook::{AuthorityOracle, Checks, ExecutionIndex};

use crate::checker::{EvaluationInput, PreconditionChecker};
use crate::types::Result;

/// Identifies one evaluation request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// What the presentation layer should show.
///
/// `Failed` is distinct from a `Ready` result with failing checks: it means
/// the evaluation could not be completed and should be retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum EvaluationStatus {
    Idle,
    Pending {
        token: RequestToken,
    },
    Ready {
        token: RequestToken,
        checks: Checks,
        evaluated_at: DateTime<Utc>,
    },
    Failed {
        token: RequestToken,
        error: String,
    },
}

impl EvaluationStatus {
    pub fn checks(&self) -> Option<&Checks> {
        match self {
            Self::Ready { checks, .. } => Some(checks),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Fenced publication point for precondition evaluations.
pub struct EvaluationSession {
    latest: AtomicU64,
    status: Arc<RwLock<EvaluationStatus>>,
}

impl EvaluationSession {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            status: Arc::new(RwLock::new(EvaluationStatus::Idle)),
        }
    }

    /// Start a new evaluation. Previously published checks are withdrawn.
    pub async fn begin(&self) -> RequestToken {
        let mut status = self.status.write().await;
        let token = RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        *status = EvaluationStatus::Pending { token };
        debug!(token = token.0, "Evaluation started");
        token
    }

    /// Publish the outcome of `token`'s evaluation.
    ///
    /// Returns `false` and leaves the status untouched when a newer
    /// evaluation has been started since.
    pub async fn complete(&self, token: RequestToken, outcome: Result<Checks>) -> bool {
        let mut status = self.status.write().await;
        // Checked under the write lock so begin() cannot interleave
        let latest = self.latest.load(Ordering::SeqCst);
        if token.0 != latest {
            warn!(token = token.0, latest, "Discarding stale evaluation result");
            return false;
        }

        *status = match outcome {
            Ok(checks) => EvaluationStatus::Ready {
                token,
                checks,
                evaluated_at: Utc::now(),
            },
            Err(e) => EvaluationStatus::Failed {
                token,
                error: e.to_string(),
            },
        };
        true
    }

    pub async fn status(&self) -> EvaluationStatus {
        self.status.read().await.clone()
    }

    /// Begin, evaluate and complete in one step. Returns whether the result was published.
    pub async fn run(
        &self,
        checker: &PreconditionChecker,
        oracle: &dyn AuthorityOracle,
        input: &EvaluationInput<'_>,
        executions: &ExecutionIndex,
    ) -> bool {
        let token = self.begin().await;
        let outcome = checker.evaluate(oracle, input, executions).await;
        self.complete(token, outcome).await
    }
}

impl Default for EvaluationSession {
    fn default() -> Self {
        Self::new()
    }
}
