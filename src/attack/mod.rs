use chrono::{Timelike, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::{AttackAttempt, AttackRecord, ScenarioType};
use crate::llm::TextGenClient;

const VENDOR_NAMES: [&str; 12] = [
    "Tech Solutions LLC",
    "Global Services Inc",
    "Premier Consulting Group",
    "Advanced Systems Corp",
    "Digital Innovations Ltd",
    "Strategic Partners LLC",
    "Enterprise Solutions Inc",
    "Professional Services Group",
    "Innovation Labs LLC",
    "Business Solutions Corp",
    "Technology Partners Inc",
    "Strategic Consulting LLC",
];

const EMPLOYEE_NAMES: [&str; 10] = [
    "Alex Rivera",
    "Nina Patel",
    "Chris Lee",
    "Sarah Johnson",
    "Michael Chen",
    "Emily Rodriguez",
    "David Thompson",
    "Jessica Wang",
    "Robert Kim",
    "Maria Garcia",
];

const JUSTIFICATIONS: [&str; 7] = [
    "urgent equipment purchases for Q4 expansion",
    "emergency software licensing renewal",
    "infrastructure upgrades for security compliance",
    "client project deliverables requiring immediate resources",
    "market research and competitive analysis",
    "team training and professional development",
    "vendor consolidation and optimization initiative",
];

/// How aggressively the generator pushes amounts and time pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    Medium,
    High,
}

impl Intensity {
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "low" => Intensity::Low,
            "high" => Intensity::High,
            _ => Intensity::Medium,
        }
    }

    /// Narrow or shift a value range: low stays conservative, high skips the
    /// bottom half.
    fn scale_range(&self, min: f64, max: f64) -> (f64, f64) {
        let span = max - min;
        match self {
            Intensity::Low => (min, min + span * 0.4),
            Intensity::Medium => (min, max),
            Intensity::High => (min + span * 0.5, max),
        }
    }

    /// Bias a trigger probability by intensity, clamped to a valid range.
    fn bias(&self, base: f64) -> f64 {
        let p = match self {
            Intensity::Low => base * 0.5,
            Intensity::Medium => base,
            Intensity::High => base * 1.5,
        };
        p.clamp(0.0, 1.0)
    }
}

/// Attacker side of the simulation: randomized attack records per scenario,
/// with optional LLM-written "attacker reasoning" attached. The reasoning is
/// narrative only; the defender never interprets it.
pub struct AttackGenerator {
    model: String,
    llm: Option<TextGenClient>,
    intensity: Intensity,
}

impl AttackGenerator {
    pub fn new(model: &str, llm: Option<TextGenClient>, intensity: Intensity) -> Self {
        Self {
            model: model.to_string(),
            llm,
            intensity,
        }
    }

    /// Produce one attempt for the scenario. Record synthesis is local and
    /// infallible; only the reasoning text touches the network, and it always
    /// has a canned fallback.
    pub async fn generate(&self, scenario: ScenarioType) -> AttackAttempt {
        let record = match scenario {
            ScenarioType::VendorFraud => self.vendor_fraud_record(),
            ScenarioType::PayrollTheft => self.payroll_theft_record(),
            ScenarioType::CardAbuse => self.card_abuse_record(),
            ScenarioType::InvoiceFraud => self.invoice_fraud_record(),
        };

        let reasoning = self.attack_reasoning(scenario, &record).await;

        AttackAttempt {
            scenario_type: scenario,
            model: self.model.clone(),
            record,
            reasoning,
            timestamp: Utc::now(),
        }
    }

    async fn attack_reasoning(&self, scenario: ScenarioType, record: &AttackRecord) -> String {
        let Some(llm) = &self.llm else {
            return fallback_reasoning(scenario);
        };
        let prompt = reasoning_prompt(scenario, record);
        match llm.generate_with_retries(&prompt).await {
            Ok(text) => {
                debug!(%scenario, "attacker reasoning generated");
                text
            }
            Err(e) => {
                warn!(%scenario, "attacker reasoning failed ({e}), using fallback text");
                fallback_reasoning(scenario)
            }
        }
    }

    fn vendor_fraud_record(&self) -> AttackRecord {
        let mut rng = rand::thread_rng();
        let (min, max) = self.intensity.scale_range(1_000.0, 25_000.0);
        let amount = rng.gen_range(min..=max).round();

        AttackRecord {
            vendor_name: Some(pick(&VENDOR_NAMES)),
            amount: Some(amount),
            description: Some(pick(&JUSTIFICATIONS)),
            is_new_vendor: Some(rng.gen_bool(0.7)),
            has_phone_number: Some(rng.gen_bool(0.6)),
            has_website: Some(rng.gen_bool(0.7)),
            has_email: Some(rng.gen_bool(0.8)),
            is_historical_vendor: Some(rng.gen_bool(0.3)),
            is_round_amount: Some(amount % 1_000.0 == 0.0),
            is_urgent_request: Some(rng.gen_bool(self.intensity.bias(0.4))),
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    fn payroll_theft_record(&self) -> AttackRecord {
        let mut rng = rand::thread_rng();

        AttackRecord {
            employee_name: Some(pick(&EMPLOYEE_NAMES)),
            new_account_number: Some(random_digits(&mut rng, 10)),
            new_routing_number: Some(random_digits(&mut rng, 9)),
            is_same_day_request: Some(rng.gen_bool(self.intensity.bias(0.3))),
            is_unknown_email: Some(rng.gen_bool(self.intensity.bias(0.4))),
            has_verification: Some(rng.gen_bool(0.5)),
            is_normal_hours: Some(is_business_hours()),
            has_previous_changes: Some(rng.gen_bool(0.2)),
            has_complete_info: Some(rng.gen_bool(0.7)),
            follows_procedure: Some(rng.gen_bool(0.6)),
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    fn card_abuse_record(&self) -> AttackRecord {
        let mut rng = rand::thread_rng();
        let current_limit = 30_000.0;
        let (min, max) = self.intensity.scale_range(35_000.0, 75_000.0);
        let requested_limit = rng.gen_range(min..=max).round();

        AttackRecord {
            card_name: Some("Engineering Team Card".to_string()),
            current_limit: Some(current_limit),
            requested_limit: Some(requested_limit),
            justification: Some(pick(&JUSTIFICATIONS)),
            is_large_increase: Some(requested_limit >= current_limit * 1.5),
            is_same_day_request: Some(rng.gen_bool(self.intensity.bias(0.3))),
            has_justification: Some(rng.gen_bool(0.8)),
            is_urgent_reason: Some(rng.gen_bool(self.intensity.bias(0.4))),
            has_detailed_justification: Some(rng.gen_bool(0.6)),
            has_historical_approval: Some(rng.gen_bool(0.3)),
            is_reasonable_amount: Some(requested_limit <= current_limit * 1.3),
            follows_policy: Some(rng.gen_bool(0.5)),
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }

    fn invoice_fraud_record(&self) -> AttackRecord {
        let mut rng = rand::thread_rng();
        let normal_amount: f64 = 3_200.0;
        let multiplier = match self.intensity {
            Intensity::Low => 1.6,
            Intensity::Medium => 2.2,
            Intensity::High => 3.0,
        };
        let amount = rng.gen_range(normal_amount..=normal_amount * multiplier).round();

        AttackRecord {
            vendor_name: Some("Northwest Utilities".to_string()),
            invoice_number: Some(invoice_number(&mut rng)),
            amount: Some(amount),
            description: Some("Monthly utilities - catch-up billing".to_string()),
            normal_amount: Some(normal_amount),
            is_inflated_amount: Some(amount > normal_amount * 1.5),
            is_new_vendor: Some(rng.gen_bool(self.intensity.bias(0.2))),
            has_generic_services: Some(rng.gen_bool(0.4)),
            has_receipts: Some(rng.gen_bool(0.6)),
            is_historical_vendor: Some(rng.gen_bool(0.7)),
            has_detailed_breakdown: Some(rng.gen_bool(0.5)),
            is_normal_amount: Some(amount <= normal_amount * 1.2),
            has_proper_formatting: Some(rng.gen_bool(0.8)),
            timestamp: Some(Utc::now()),
            ..Default::default()
        }
    }
}

fn pick(pool: &[&str]) -> String {
    let mut rng = rand::thread_rng();
    pool.choose(&mut rng).copied().unwrap_or("").to_string()
}

fn random_digits(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

fn invoice_number(rng: &mut impl Rng) -> String {
    format!("INV-{}-{:04}", Utc::now().format("%Y"), rng.gen_range(0..10_000))
}

fn is_business_hours() -> bool {
    let hour = Utc::now().hour();
    (9..17).contains(&hour)
}

fn fallback_reasoning(scenario: ScenarioType) -> String {
    format!("Fallback: random {scenario} attack generation (strategic planning unavailable)")
}

fn reasoning_prompt(scenario: ScenarioType, record: &AttackRecord) -> String {
    let detail = match scenario {
        ScenarioType::VendorFraud => format!(
            "vendor {} requesting ${:.0}",
            record.vendor_name.as_deref().unwrap_or("unknown"),
            record.amount.unwrap_or(0.0)
        ),
        ScenarioType::PayrollTheft => format!(
            "banking change for employee {}",
            record.employee_name.as_deref().unwrap_or("unknown")
        ),
        ScenarioType::CardAbuse => format!(
            "card limit increase to ${:.0}",
            record.requested_limit.unwrap_or(0.0)
        ),
        ScenarioType::InvoiceFraud => format!(
            "invoice {} for ${:.0}",
            record.invoice_number.as_deref().unwrap_or("unknown"),
            record.amount.unwrap_or(0.0)
        ),
    };
    format!(
        "You are simulating a {scenario} attempt in a defensive fraud-research sandbox. \
         In one or two sentences, explain the attacker's strategy for this attempt: {detail}."
    )
}
