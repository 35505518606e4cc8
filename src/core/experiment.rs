use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::attack::AttackGenerator;
use crate::core::{AttackAttempt, Decision, EvaluationResult, ScenarioType};
use crate::engine::DefenderAi;

/// One finished round, forwarded to the reporter.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round: usize,
    pub attack: AttackAttempt,
    pub result: EvaluationResult,
}

/// The production per-round evaluation: hand each attempt to the defender.
pub fn defender_evaluation(
    defender: Arc<DefenderAi>,
) -> impl Fn(AttackAttempt) -> std::pin::Pin<Box<dyn Future<Output = EvaluationResult> + Send>> {
    move |attack| {
        let defender = defender.clone();
        Box::pin(async move { defender.evaluate_attack(&attack).await })
    }
}

/// Run the experiment: generate an attempt per round, evaluate it, forward
/// the outcome. The loop round-robins over the configured scenarios and
/// sleeps between rounds; each evaluation runs in a spawned task so a
/// panicking round degrades to a default-deny result instead of killing the
/// loop.
pub async fn run_experiment<F, Fut>(
    rounds: usize,
    scenarios: Vec<ScenarioType>,
    delay: Duration,
    generator: AttackGenerator,
    threshold: i32,
    evaluate: F,
    out_tx: mpsc::UnboundedSender<RoundOutcome>,
) where
    F: Fn(AttackAttempt) -> Fut,
    Fut: Future<Output = EvaluationResult> + Send + 'static,
{
    if scenarios.is_empty() {
        error!("no scenarios configured, nothing to run");
        return;
    }

    info!(rounds, scenarios = scenarios.len(), "experiment started");

    for round in 1..=rounds {
        let scenario = scenarios[(round - 1) % scenarios.len()];
        let attack = generator.generate(scenario).await;

        let result = match tokio::spawn(evaluate(attack.clone())).await {
            Ok(result) => result,
            Err(e) => {
                // Evaluation panicked; deny conservatively and keep going.
                error!(round, %scenario, "evaluation task failed: {e}");
                EvaluationResult::default_deny(threshold)
            }
        };

        if out_tx.send(RoundOutcome { round, attack, result }).is_err() {
            info!("reporter channel closed, stopping experiment");
            return;
        }

        if round < rounds && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    info!(rounds, "experiment finished");
}

/// Aggregate counters over an experiment run.
#[derive(Debug, Default)]
pub struct ExperimentStats {
    pub rounds: usize,
    pub approved: usize,
    pub rejected: usize,
    per_scenario: HashMap<ScenarioType, (usize, usize)>, // (attempts, approved)
}

impl ExperimentStats {
    pub fn record(&mut self, outcome: &RoundOutcome) {
        self.rounds += 1;
        let entry = self
            .per_scenario
            .entry(outcome.attack.scenario_type)
            .or_default();
        entry.0 += 1;
        match outcome.result.decision {
            Decision::Approve => {
                self.approved += 1;
                entry.1 += 1;
            }
            Decision::Reject => self.rejected += 1,
        }
    }

    pub fn scenario_counts(&self, scenario: ScenarioType) -> (usize, usize) {
        self.per_scenario.get(&scenario).copied().unwrap_or((0, 0))
    }

    /// Multi-line summary for the end-of-run log.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} rounds: {} approved (attacker wins), {} rejected",
            self.rounds, self.approved, self.rejected
        );
        for scenario in ScenarioType::ALL {
            let (attempts, approved) = self.scenario_counts(scenario);
            if attempts > 0 {
                out.push_str(&format!("\n  {scenario}: {approved}/{attempts} approved"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::Intensity;
    use crate::engine::{DefenderAi, SuspicionScorer};
    use crate::rules::RuleStore;
    use chrono::Utc;

    fn outcome(scenario: ScenarioType, decision: Decision) -> RoundOutcome {
        RoundOutcome {
            round: 1,
            attack: AttackAttempt {
                scenario_type: scenario,
                model: "test".to_string(),
                record: Default::default(),
                reasoning: String::new(),
                timestamp: Utc::now(),
            },
            result: EvaluationResult {
                suspicion_score: 0,
                decision,
                success: decision == Decision::Approve,
                reasoning: String::new(),
                rules_applied: 0,
                rule_analysis: Vec::new(),
                threshold: 10,
            },
        }
    }

    #[test]
    fn stats_accumulate_per_scenario() {
        let mut stats = ExperimentStats::default();
        stats.record(&outcome(ScenarioType::VendorFraud, Decision::Approve));
        stats.record(&outcome(ScenarioType::VendorFraud, Decision::Reject));
        stats.record(&outcome(ScenarioType::CardAbuse, Decision::Approve));

        assert_eq!(stats.rounds, 3);
        assert_eq!(stats.approved, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.scenario_counts(ScenarioType::VendorFraud), (2, 1));
        assert_eq!(stats.scenario_counts(ScenarioType::CardAbuse), (1, 1));
        assert_eq!(stats.scenario_counts(ScenarioType::InvoiceFraud), (0, 0));

        let summary = stats.summary();
        assert!(summary.contains("3 rounds"));
        assert!(summary.contains("vendor_fraud: 1/2 approved"));
        assert!(!summary.contains("invoice_fraud"));
    }

    #[tokio::test]
    async fn experiment_runs_offline_end_to_end() {
        let generator = AttackGenerator::new("test-model", None, Intensity::Medium);
        let defender = Arc::new(DefenderAi::new(
            SuspicionScorer::default(),
            Arc::new(RuleStore::offline()),
            None,
        ));
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_experiment(
            6,
            vec![ScenarioType::VendorFraud, ScenarioType::PayrollTheft],
            Duration::ZERO,
            generator,
            10,
            defender_evaluation(defender),
            tx,
        )
        .await;

        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        assert_eq!(outcomes.len(), 6);
        // Round-robin over the two scenarios.
        assert_eq!(outcomes[0].attack.scenario_type, ScenarioType::VendorFraud);
        assert_eq!(outcomes[1].attack.scenario_type, ScenarioType::PayrollTheft);
        assert_eq!(outcomes[2].attack.scenario_type, ScenarioType::VendorFraud);
        // Every round produced a complete evaluation against the fallback set.
        for outcome in &outcomes {
            assert!(outcome.result.rules_applied >= 3);
            assert!(outcome.result.reasoning.starts_with("Suspicion Score: "));
        }
    }

    #[tokio::test]
    async fn panicking_evaluation_denies_and_loop_continues() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let generator = AttackGenerator::new("test-model", None, Intensity::Medium);
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Second round blows up; the other rounds evaluate normally.
        let calls = Arc::new(AtomicUsize::new(0));
        let evaluate = move |_attack: AttackAttempt| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 1 {
                    panic!("synthetic evaluation failure");
                }
                EvaluationResult {
                    suspicion_score: 0,
                    decision: Decision::Approve,
                    success: true,
                    reasoning: "Suspicion Score: 0. Decision: APPROVE.".to_string(),
                    rules_applied: 3,
                    rule_analysis: Vec::new(),
                    threshold: 10,
                }
            }
        };

        run_experiment(
            3,
            vec![ScenarioType::VendorFraud],
            Duration::ZERO,
            generator,
            10,
            evaluate,
            tx,
        )
        .await;

        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        // The failed round degraded to the conservative result; the loop
        // still ran all three rounds.
        assert_eq!(outcomes.len(), 3);
        let failed = &outcomes[1];
        assert_eq!(failed.result.decision, Decision::Reject);
        assert_eq!(failed.result.rules_applied, 0);
        assert_eq!(failed.result.suspicion_score, -50);
        assert!(failed.result.reasoning.contains("Error"));
        assert!(!failed.result.success);
        assert_eq!(outcomes[0].result.decision, Decision::Approve);
        assert_eq!(outcomes[2].result.decision, Decision::Approve);
    }
}
