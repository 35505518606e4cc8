pub mod experiment;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The fraud pattern a simulated attempt belongs to. Closed set; adding a
/// scenario means adding predicate entries and a fallback rule table too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    VendorFraud,
    PayrollTheft,
    CardAbuse,
    InvoiceFraud,
}

impl ScenarioType {
    pub const ALL: [ScenarioType; 4] = [
        ScenarioType::VendorFraud,
        ScenarioType::PayrollTheft,
        ScenarioType::CardAbuse,
        ScenarioType::InvoiceFraud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioType::VendorFraud => "vendor_fraud",
            ScenarioType::PayrollTheft => "payroll_theft",
            ScenarioType::CardAbuse => "card_abuse",
            ScenarioType::InvoiceFraud => "invoice_fraud",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "vendor_fraud" => Some(ScenarioType::VendorFraud),
            "payroll_theft" => Some(ScenarioType::PayrollTheft),
            "card_abuse" => Some(ScenarioType::CardAbuse),
            "invoice_fraud" => Some(ScenarioType::InvoiceFraud),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Defender verdict on one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Reject => "REJECT",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weighted business rule. Negative weight is a red flag (raises
/// suspicion), positive weight is a trust signal. `parameter_name` is a
/// symbolic key resolved against the predicate table at evaluation time;
/// names the table does not know simply never trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub parameter_name: String,
    pub weight: i32,
    pub description: String,
}

impl Rule {
    pub fn new(parameter_name: &str, weight: i32, description: &str) -> Self {
        Self {
            parameter_name: parameter_name.to_string(),
            weight,
            description: description.to_string(),
        }
    }
}

/// One simulated fraud attempt's attribute bag, spanning all four scenarios.
///
/// Every field is optional and a given scenario only populates its own
/// subset. Flags are `Option<bool>` rather than `bool`: the `noVerification`
/// predicate fires on an explicit `false`, not on absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttackRecord {
    // Identity / free-text fields
    pub vendor_name: Option<String>,
    pub employee_name: Option<String>,
    pub card_name: Option<String>,
    pub invoice_number: Option<String>,
    pub description: Option<String>,
    pub justification: Option<String>,
    pub new_account_number: Option<String>,
    pub new_routing_number: Option<String>,

    // Numeric fields (dollars)
    pub amount: Option<f64>,
    pub normal_amount: Option<f64>,
    pub current_limit: Option<f64>,
    pub requested_limit: Option<f64>,

    // Vendor fraud flags
    pub is_new_vendor: Option<bool>,
    pub has_phone_number: Option<bool>,
    pub has_website: Option<bool>,
    pub has_email: Option<bool>,
    pub is_historical_vendor: Option<bool>,
    pub is_round_amount: Option<bool>,
    pub is_urgent_request: Option<bool>,

    // Payroll theft flags
    pub is_same_day_request: Option<bool>,
    pub is_unknown_email: Option<bool>,
    pub has_verification: Option<bool>,
    pub is_normal_hours: Option<bool>,
    pub has_previous_changes: Option<bool>,
    pub has_complete_info: Option<bool>,
    pub follows_procedure: Option<bool>,

    // Card abuse flags
    pub is_large_increase: Option<bool>,
    pub has_justification: Option<bool>,
    pub is_urgent_reason: Option<bool>,
    pub has_detailed_justification: Option<bool>,
    pub has_historical_approval: Option<bool>,
    pub is_reasonable_amount: Option<bool>,
    pub follows_policy: Option<bool>,

    // Invoice fraud flags
    pub is_inflated_amount: Option<bool>,
    pub has_generic_services: Option<bool>,
    pub has_receipts: Option<bool>,
    pub has_detailed_breakdown: Option<bool>,
    pub is_normal_amount: Option<bool>,
    pub has_proper_formatting: Option<bool>,

    pub timestamp: Option<DateTime<Utc>>,
}

/// Per-rule outcome emitted for every input rule, triggered or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAnalysis {
    pub parameter_name: String,
    pub description: String,
    pub weight: i32,
    pub triggered: bool,
}

/// One attacker-side attempt handed to the defender. The defender treats
/// `record` as opaque data and never interprets `reasoning`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackAttempt {
    pub scenario_type: ScenarioType,
    pub model: String,
    pub record: AttackRecord,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

/// Immutable outcome of one defender evaluation. Created fresh per call,
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub suspicion_score: i32,
    pub decision: Decision,
    pub success: bool,
    pub reasoning: String,
    pub rules_applied: usize,
    pub rule_analysis: Vec<RuleAnalysis>,
    pub threshold: i32,
}

impl EvaluationResult {
    /// Conservative result for an unexpected internal failure: deny, mark the
    /// reasoning as an error, report zero rules applied.
    pub fn default_deny(threshold: i32) -> Self {
        Self {
            suspicion_score: -50,
            decision: Decision::Reject,
            success: false,
            reasoning: "Error in evaluation - defaulting to reject".to_string(),
            rules_applied: 0,
            rule_analysis: Vec::new(),
            threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_roundtrip() {
        for s in ScenarioType::ALL {
            assert_eq!(ScenarioType::from_str_opt(s.as_str()), Some(s));
        }
        assert_eq!(ScenarioType::from_str_opt("wire_fraud"), None);
    }

    #[test]
    fn scenario_serde_wire_names() {
        let json = serde_json::to_string(&ScenarioType::VendorFraud).unwrap();
        assert_eq!(json, "\"vendor_fraud\"");
        let back: ScenarioType = serde_json::from_str("\"card_abuse\"").unwrap();
        assert_eq!(back, ScenarioType::CardAbuse);
    }

    #[test]
    fn decision_display() {
        assert_eq!(Decision::Approve.to_string(), "APPROVE");
        assert_eq!(Decision::Reject.to_string(), "REJECT");
    }

    #[test]
    fn record_camel_case_wire_shape() {
        let record = AttackRecord {
            vendor_name: Some("Tech Solutions LLC".to_string()),
            is_new_vendor: Some(true),
            amount: Some(12_500.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["vendorName"], "Tech Solutions LLC");
        assert_eq!(json["isNewVendor"], true);
        assert_eq!(json["amount"], 12_500.0);
    }

    #[test]
    fn record_missing_fields_deserialize() {
        let record: AttackRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, AttackRecord::default());
        // Partial records never fail either.
        let record: AttackRecord =
            serde_json::from_str(r#"{"hasVerification": false}"#).unwrap();
        assert_eq!(record.has_verification, Some(false));
        assert_eq!(record.amount, None);
    }

    #[test]
    fn default_deny_shape() {
        let result = EvaluationResult::default_deny(10);
        assert_eq!(result.decision, Decision::Reject);
        assert_eq!(result.suspicion_score, -50);
        assert_eq!(result.rules_applied, 0);
        assert!(!result.success);
        assert!(result.reasoning.contains("Error"));
    }
}
