pub mod explain;
pub mod predicates;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::{AttackAttempt, AttackRecord, Decision, EvaluationResult, Rule, RuleAnalysis};
use crate::db::SharedDatabase;
use crate::rules::RuleStore;

/// Suspicion threshold at or above which an attempt is rejected.
pub const DEFAULT_THRESHOLD: i32 = 10;

/// Deterministic, side-effect-free scoring of one attack record against one
/// rule set. Negative weights raise suspicion, positive weights lower it;
/// the decision compares the signed sum against a positive threshold.
pub struct SuspicionScorer {
    threshold: i32,
}

impl SuspicionScorer {
    pub fn new(threshold: i32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    /// Evaluate every rule independently against the record. Triggered
    /// weights are summed without clamping; an analysis entry is emitted for
    /// every input rule in input order, triggered or not. Unknown parameter
    /// names and missing record fields never trigger and never error.
    pub fn evaluate(&self, record: &AttackRecord, rules: &[Rule]) -> (i32, Vec<RuleAnalysis>) {
        let mut total = 0;
        let mut analysis = Vec::with_capacity(rules.len());

        for rule in rules {
            let triggered = predicates::triggers(&rule.parameter_name, record);
            if triggered {
                total += rule.weight;
            }
            analysis.push(RuleAnalysis {
                parameter_name: rule.parameter_name.clone(),
                description: rule.description.clone(),
                weight: rule.weight,
                triggered,
            });
        }

        (total, analysis)
    }

    /// REJECT iff `score >= threshold`.
    pub fn decide(&self, score: i32) -> Decision {
        if score >= self.threshold {
            Decision::Reject
        } else {
            Decision::Approve
        }
    }
}

impl Default for SuspicionScorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// The defender side of the simulation: fetches the scenario's rules, scores
/// the attempt, explains the decision, and best-effort logs the attempt.
pub struct DefenderAi {
    scorer: SuspicionScorer,
    store: Arc<RuleStore>,
    sink: Option<SharedDatabase>,
}

impl DefenderAi {
    pub fn new(scorer: SuspicionScorer, store: Arc<RuleStore>, sink: Option<SharedDatabase>) -> Self {
        Self { scorer, store, sink }
    }

    pub fn threshold(&self) -> i32 {
        self.scorer.threshold()
    }

    /// Evaluate one attempt. Always returns a valid result: rule-store
    /// failures fall back to built-in rules inside the store, and persistence
    /// runs fire-and-forget so a sink failure can never alter the decision.
    pub async fn evaluate_attack(&self, attack: &AttackAttempt) -> EvaluationResult {
        let rules = self.store.fetch_rules(attack.scenario_type).await;

        let (score, analysis) = self.scorer.evaluate(&attack.record, &rules);
        let decision = self.scorer.decide(score);
        let reasoning = explain::explain(&attack.record, &rules, score, decision);

        debug!(
            scenario = %attack.scenario_type,
            score,
            %decision,
            rules = rules.len(),
            "attack evaluated"
        );

        let result = EvaluationResult {
            suspicion_score: score,
            decision,
            success: decision == Decision::Approve,
            reasoning,
            rules_applied: rules.len(),
            rule_analysis: analysis,
            threshold: self.scorer.threshold(),
        };

        self.store_attempt(attack, &result);
        result
    }

    /// Fire-and-forget persistence. Runs on the blocking pool; failures are
    /// logged and never surfaced to the evaluation path.
    fn store_attempt(&self, attack: &AttackAttempt, result: &EvaluationResult) {
        let Some(db) = self.sink.clone() else {
            debug!("no attempt sink configured, skipping storage");
            return;
        };
        let attack = attack.clone();
        let result = result.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = db.store_attempt(&attack, &result) {
                warn!("failed to store attack attempt: {e}");
            }
        });
    }
}
