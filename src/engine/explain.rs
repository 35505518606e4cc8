use crate::core::{AttackRecord, Decision, Rule};
use crate::engine::predicates;

/// Render the defender's human-readable reasoning for one evaluation.
///
/// Triggered rules are partitioned by weight sign: negative weights are
/// suspicious factors, positive weights are trusted factors. The output shape
/// is a display contract; downstream consumers show it verbatim.
pub fn explain(record: &AttackRecord, rules: &[Rule], score: i32, decision: Decision) -> String {
    let triggered: Vec<&Rule> = rules
        .iter()
        .filter(|rule| predicates::triggers(&rule.parameter_name, record))
        .collect();

    let suspicious: Vec<&str> = triggered
        .iter()
        .filter(|rule| rule.weight < 0)
        .map(|rule| rule.description.as_str())
        .collect();
    let trusted: Vec<&str> = triggered
        .iter()
        .filter(|rule| rule.weight > 0)
        .map(|rule| rule.description.as_str())
        .collect();

    let mut reasoning = format!("Suspicion Score: {score}. ");
    if !suspicious.is_empty() {
        reasoning.push_str(&format!("Suspicious factors: {}. ", suspicious.join(", ")));
    }
    if !trusted.is_empty() {
        reasoning.push_str(&format!("Trusted factors: {}. ", trusted.join(", ")));
    }
    reasoning.push_str(&format!("Decision: {decision}."));
    reasoning
}
