//! Rule execution engine.
//!
//! Executes the rules of a catalog that apply to one request, in dependency
//! order, as a round-based fixpoint:
//!
//! 1. A rule whose dependency failed, was skipped, or asked to skip its
//!    dependents is recorded as skipped without running.
//! 2. A rule whose dependencies all succeeded (or that has none) runs.
//! 3. Any other rule waits for the next round.
//!
//! A round that resolves nothing means the remaining rules can never run.
//! Against a validated catalog this only happens with a dependency cycle and
//! aborts the run with [`EngineError::NoProgress`].

use crate::rules::{NumberedRule, RuleCatalog, RuleContext, RuleOutcome};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Final status of one rule in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum EvaluationStatus {
    Success,
    /// Always carries a non-empty message.
    Failure(String),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEvaluation {
    pub rule: String,
    #[serde(flatten)]
    pub status: EvaluationStatus,
}

impl RuleEvaluation {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, EvaluationStatus::Failure(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, EvaluationStatus::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("rule evaluation made no progress; unresolvable rules: {}", remaining.join(", "))]
    NoProgress { remaining: Vec<String> },
}

/// What the scheduler remembers about a resolved rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Success,
    SuccessSkipDependents,
    Failure,
    Skipped,
}

impl Resolution {
    fn blocks_dependents(self) -> bool {
        !matches!(self, Resolution::Success)
    }
}

/// Separator between the messages of a rule that reported several problems.
pub const MESSAGE_SEPARATOR: &str = "; ";

/// Schedules the rules of one catalog.
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'c> {
    catalog: &'c RuleCatalog,
}

impl<'c> RuleEngine<'c> {
    pub fn new(catalog: &'c RuleCatalog) -> Self {
        Self { catalog }
    }

    /// Evaluate every rule applicable to `ctx`'s variant and context.
    ///
    /// Returns exactly one evaluation per applicable rule, in catalog order.
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<RuleEvaluation>, EngineError> {
        let active = self.catalog.active(ctx.variant, ctx.context);
        let mut resolved: HashMap<&str, Resolution> = HashMap::new();
        let mut statuses: Vec<Option<EvaluationStatus>> = vec![None; active.len()];
        let mut remaining: Vec<usize> = (0..active.len()).collect();

        while !remaining.is_empty() {
            let before = remaining.len();
            let mut deferred = Vec::new();

            for idx in remaining {
                let rule = active[idx];
                let deps: Vec<Option<Resolution>> = rule
                    .dependencies()
                    .iter()
                    .map(|d| resolved.get(d.as_str()).copied())
                    .collect();

                if deps.iter().flatten().any(|r| r.blocks_dependents()) {
                    debug!(rule = rule.number(), "skipped: a dependency did not succeed");
                    resolved.insert(rule.number(), Resolution::Skipped);
                    statuses[idx] = Some(EvaluationStatus::Skipped);
                } else if deps.iter().all(Option::is_some) {
                    let (resolution, status) = execute(rule, ctx);
                    resolved.insert(rule.number(), resolution);
                    statuses[idx] = Some(status);
                } else {
                    deferred.push(idx);
                }
            }

            if deferred.len() == before {
                let remaining: Vec<String> = deferred
                    .iter()
                    .map(|&i| active[i].number().to_string())
                    .collect();
                error!(rules = ?remaining, "rule evaluation made no progress");
                return Err(EngineError::NoProgress { remaining });
            }
            remaining = deferred;
        }

        Ok(active
            .iter()
            .zip(statuses)
            .map(|(rule, status)| RuleEvaluation {
                rule: rule.number().to_string(),
                status: status.unwrap_or(EvaluationStatus::Skipped),
            })
            .collect())
    }
}

/// Run one rule body and map its outcome. Faults become failures of this rule.
fn execute(rule: &NumberedRule, ctx: &RuleContext<'_>) -> (Resolution, EvaluationStatus) {
    match rule.run(ctx) {
        Ok(RuleOutcome::Success) => {
            debug!(rule = rule.number(), "success");
            (Resolution::Success, EvaluationStatus::Success)
        }
        Ok(RuleOutcome::SkipDependents) => {
            debug!(rule = rule.number(), "success, dependents skipped");
            (Resolution::SuccessSkipDependents, EvaluationStatus::Success)
        }
        Ok(RuleOutcome::Error { messages, cause }) => {
            let message = failure_message(&messages, cause.as_ref());
            debug!(rule = rule.number(), message = %message, "failure");
            (Resolution::Failure, EvaluationStatus::Failure(message))
        }
        Err(fault) => {
            warn!(rule = rule.number(), error = %format!("{:#}", fault), "rule body fault");
            let message = format!("{:#}", fault);
            let message = if message.is_empty() {
                format!("rule {} failed unexpectedly", rule.number())
            } else {
                message
            };
            (Resolution::Failure, EvaluationStatus::Failure(message))
        }
    }
}

fn failure_message(messages: &[String], cause: Option<&anyhow::Error>) -> String {
    let joined = messages
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect::<Vec<_>>()
        .join(MESSAGE_SEPARATOR);
    match (joined.is_empty(), cause) {
        (false, _) => joined,
        (true, Some(cause)) => format!("{:#}", cause),
        (true, None) => "rule reported an error without a message".to_string(),
    }
}
