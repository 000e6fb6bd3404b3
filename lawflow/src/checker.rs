//! Precondition checker - decides whether an action may execute now.
//!
//! Mirrors the protocol's execution gate off-chain: role authorization, vote
//! outcome, completion of dependent laws, and the delay and throttle windows.
//! The verdict is computed from a snapshot; nothing is written.

use futures::future::try_join_all;
use tracing::{debug, info};

use lawbook::{
    Action, Address, AuthorityOracle, Calldata, Checks, Dependency, ExecutionIndex, ExecutionLog,
    Law, MatchPolicy, Proposal,
};

use crate::config::CheckerConfig;
use crate::types::Result;

/// Everything an evaluation needs apart from chain reads.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    /// Law the action targets
    pub law: &'a Law,
    pub calldata: &'a Calldata,
    pub description: &'a str,
    /// Account that wants to execute
    pub caller: &'a Address,
    /// Proposals of the organisation snapshot
    pub proposals: &'a [Proposal],
    /// Block number in the protocol's block domain
    pub current_block: u64,
}

impl EvaluationInput<'_> {
    pub fn action(&self) -> Action {
        Action::new(self.law.law, self.calldata.clone(), self.description)
    }
}

/// Evaluates execution preconditions against a snapshot.
pub struct PreconditionChecker {
    config: CheckerConfig,
}

impl PreconditionChecker {
    /// Create a checker with default configuration.
    pub fn new() -> Self {
        Self::with_config(CheckerConfig::default())
    }

    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Evaluate with a caller-supplied execution index.
    ///
    /// Only the authorization oracle is queried. A failed query aborts the
    /// evaluation; no partial [`Checks`] is returned.
    pub async fn evaluate(
        &self,
        oracle: &dyn AuthorityOracle,
        input: &EvaluationInput<'_>,
        executions: &ExecutionIndex,
    ) -> Result<Checks> {
        let authorised = oracle.can_call(input.caller, &input.law.law).await?;
        Ok(self.finish(input, authorised, executions))
    }

    /// Evaluate, reading executions of the law and its dependencies from `log`.
    ///
    /// With `batch_reads` enabled the authorization query and every log read
    /// run concurrently. Any failed read aborts the whole evaluation.
    pub async fn evaluate_fetching(
        &self,
        oracle: &dyn AuthorityOracle,
        log: &dyn ExecutionLog,
        input: &EvaluationInput<'_>,
    ) -> Result<Checks> {
        let laws = laws_to_read(input.law);
        debug!(
            law = %input.law.law,
            reads = laws.len() + 1,
            batched = self.config.batch_reads,
            "Reading chain state for evaluation"
        );

        let (authorised, records) = if self.config.batch_reads {
            futures::try_join!(
                oracle.can_call(input.caller, &input.law.law),
                try_join_all(laws.iter().map(|law| log.executions(law))),
            )?
        } else {
            let authorised = oracle.can_call(input.caller, &input.law.law).await?;
            let mut records = Vec::with_capacity(laws.len());
            for law in &laws {
                records.push(log.executions(law).await?);
            }
            (authorised, records)
        };

        let mut index = ExecutionIndex::new();
        for (law, law_records) in laws.into_iter().zip(records) {
            index.set_law(law, law_records);
        }

        Ok(self.finish(input, authorised, &index))
    }

    fn finish(&self, input: &EvaluationInput<'_>, authorised: bool, executions: &ExecutionIndex) -> Checks {
        let action = input.action();
        let checks = compute_checks(
            input.law,
            &action,
            authorised,
            input.proposals,
            executions,
            input.current_block,
            self.config.match_policy,
        );

        info!(
            law = %input.law.law,
            action_id = %action.id_with(self.config.match_policy),
            current_block = input.current_block,
            all_passed = checks.all_passed(),
            failing = ?checks.failing(),
            "Evaluated execution preconditions"
        );

        checks
    }
}

impl Default for PreconditionChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// The target law plus the laws whose completion it is gated on.
fn laws_to_read(law: &Law) -> Vec<Address> {
    let mut laws = vec![law.law];
    for dep in [law.config.need_completed, law.config.need_not_completed] {
        if let Some(addr) = dep.target() {
            if !laws.contains(&addr) {
                laws.push(addr);
            }
        }
    }
    laws
}

/// Proposal for `action`; the latest by vote start, then vote end, then input order.
pub fn matching_proposal<'a>(
    action: &Action,
    proposals: &'a [Proposal],
    policy: MatchPolicy,
) -> Option<&'a Proposal> {
    let id = action.id_with(policy);
    proposals
        .iter()
        .filter(|p| p.action().id_with(policy) == id)
        .max_by_key(|p| (p.vote_start, p.vote_end))
}

/// Compute every check from already-fetched data.
///
/// All window comparisons are strict: a law is executable only once
/// `current_block` exceeds the threshold.
pub fn compute_checks(
    law: &Law,
    action: &Action,
    authorised: bool,
    proposals: &[Proposal],
    executions: &ExecutionIndex,
    current_block: u64,
    policy: MatchPolicy,
) -> Checks {
    let config = &law.config;
    let proposal = matching_proposal(action, proposals, policy);

    let (proposal_exists, proposal_passed) = if config.requires_vote() {
        (
            proposal.is_some(),
            proposal.map(|p| p.state.has_passed()).unwrap_or(false),
        )
    } else {
        (true, true)
    };

    let proposal_not_completed = executions.find_matching(&law.law, action, policy).is_none();

    let law_completed = match config.need_completed {
        Dependency::None => true,
        Dependency::On(dep) => executions.find_matching(&dep, action, policy).is_some(),
    };

    let law_not_completed = match config.need_not_completed {
        Dependency::None => true,
        Dependency::On(dep) => executions.find_matching(&dep, action, policy).is_none(),
    };

    // No proposal means no vote end to count from
    let delay_passed = config.delay_execution == 0
        || proposal
            .map(|p| p.vote_end.saturating_add(config.delay_execution) < current_block)
            .unwrap_or(false);

    let throttle_passed = config.throttle_execution == 0
        || executions
            .latest(&law.law)
            .map(|last| last.block_number.saturating_add(config.throttle_execution) < current_block)
            .unwrap_or(true);

    Checks {
        authorised,
        proposal_exists,
        proposal_passed,
        proposal_not_completed,
        law_completed,
        law_not_completed,
        delay_passed,
        throttle_passed,
    }
}
