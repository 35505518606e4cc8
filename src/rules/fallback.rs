use crate::core::{Rule, ScenarioType};

/// Built-in default rules used whenever the external rule API is absent or
/// failing. Every parameter name here resolves in the predicate table, and
/// each description names the condition its predicate actually checks.
pub fn fallback_rules(scenario: ScenarioType) -> Vec<Rule> {
    match scenario {
        ScenarioType::VendorFraud => vec![
            Rule::new("isNewVendor", -20, "Suspicious - new vendors need verification"),
            Rule::new("largeAmount", -15, "Suspicious - amounts over $10,000"),
            Rule::new("hasWebsite", 5, "Less suspicious - has web presence"),
            Rule::new("isHistoricalVendor", 20, "Trusted - known vendor"),
        ],
        ScenarioType::PayrollTheft => vec![
            Rule::new("isSameDayRequest", -25, "Very suspicious - immediate banking change"),
            Rule::new("hasVerification", 20, "Trusted - confirmed identity"),
            Rule::new("hasCompleteInfo", 8, "Less suspicious - provides complete details"),
        ],
        ScenarioType::CardAbuse => vec![
            Rule::new("largeLimitRequest", -20, "Suspicious - limit increase over $45,000"),
            Rule::new("hasJustification", 10, "Less suspicious - provides business case"),
            Rule::new("followsPolicy", 12, "Trusted - follows company policies"),
        ],
        ScenarioType::InvoiceFraud => vec![
            Rule::new("inflatedInvoiceAmount", -20, "Suspicious - inflated amount"),
            Rule::new("isHistoricalVendor", 18, "Trusted - established vendor"),
            Rule::new("hasDetailedBreakdown", 10, "Less suspicious - detailed breakdown"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::predicates;

    #[test]
    fn every_scenario_has_rules() {
        for scenario in ScenarioType::ALL {
            let rules = fallback_rules(scenario);
            assert!(
                (3..=4).contains(&rules.len()),
                "{scenario} has {} fallback rules",
                rules.len()
            );
        }
    }

    #[test]
    fn every_fallback_parameter_resolves() {
        for scenario in ScenarioType::ALL {
            for rule in fallback_rules(scenario) {
                assert!(
                    predicates::lookup(&rule.parameter_name).is_some(),
                    "{scenario}: {} has no predicate",
                    rule.parameter_name
                );
            }
        }
    }

    #[test]
    fn each_scenario_mixes_red_flags_and_trust_signals() {
        for scenario in ScenarioType::ALL {
            let rules = fallback_rules(scenario);
            assert!(rules.iter().any(|r| r.weight < 0), "{scenario} has no red flag");
            assert!(rules.iter().any(|r| r.weight > 0), "{scenario} has no trust signal");
        }
    }
}
