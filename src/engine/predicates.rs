use crate::core::AttackRecord;

/// A pure trigger test over one attack record.
pub type PredicateFn = fn(&AttackRecord) -> bool;

/// Dollar amount above which `largeAmount` fires.
pub const LARGE_AMOUNT_THRESHOLD: f64 = 10_000.0;
/// Requested card limit above which `largeLimitRequest` fires.
pub const LARGE_LIMIT_THRESHOLD: f64 = 45_000.0;
/// Invoice amount above which `inflatedInvoiceAmount` fires.
pub const INFLATED_INVOICE_THRESHOLD: f64 = 7_000.0;

/// Vendor-name fragments that mark a name as generic boilerplate.
const GENERIC_NAME_FRAGMENTS: [&str; 3] = ["Solutions", "Services", "Consulting"];

/// Resolve a rule's parameter name to its trigger predicate.
///
/// The table spans all four scenarios; any rule may reference any entry.
/// Unknown names resolve to `None`, which the scorer treats as "never
/// triggers" so rule sets can grow without code changes. Flag predicates fire
/// only on an explicit value; a missing field never triggers anything.
pub fn lookup(name: &str) -> Option<PredicateFn> {
    let predicate: PredicateFn = match name {
        // Vendor fraud
        "newVendor" | "isNewVendor" => |r| r.is_new_vendor == Some(true),
        "largeAmount" => |r| r.amount.is_some_and(|a| a > LARGE_AMOUNT_THRESHOLD),
        "genericName" => |r| {
            r.vendor_name.as_deref().is_some_and(|name| {
                GENERIC_NAME_FRAGMENTS.iter().any(|frag| name.contains(frag))
            })
        },
        "hasPhoneNumber" => |r| r.has_phone_number == Some(true),
        "hasWebsite" => |r| r.has_website == Some(true),
        "hasEmail" => |r| r.has_email == Some(true),
        "historicalVendor" | "isHistoricalVendor" => |r| r.is_historical_vendor == Some(true),
        "roundAmount" => |r| {
            r.is_round_amount == Some(true)
                || r.amount.is_some_and(|a| a != 0.0 && a % 1_000.0 == 0.0)
        },
        "urgentRequest" => |r| r.is_urgent_request == Some(true),

        // Payroll theft
        "sameDayRequest" | "isSameDayRequest" => |r| r.is_same_day_request == Some(true),
        "unknownEmail" => |r| r.is_unknown_email == Some(true),
        "noVerification" => |r| r.has_verification == Some(false),
        "verifiedEmployee" | "hasVerification" => |r| r.has_verification == Some(true),
        "normalHours" => |r| r.is_normal_hours == Some(true),
        "previousChanges" => |r| r.has_previous_changes == Some(true),
        "completeInfo" | "hasCompleteInfo" => |r| r.has_complete_info == Some(true),
        "followsProcedure" => |r| r.follows_procedure == Some(true),

        // Card abuse
        "largeIncrease" => |r| r.is_large_increase == Some(true),
        "largeLimitRequest" => {
            |r| r.requested_limit.is_some_and(|l| l > LARGE_LIMIT_THRESHOLD)
        }
        "noJustification" => |r| r.has_justification == Some(false),
        "hasJustification" => |r| r.has_justification == Some(true),
        "urgentReason" => |r| r.is_urgent_reason == Some(true),
        "detailedJustification" => |r| r.has_detailed_justification == Some(true),
        "historicalApproval" => |r| r.has_historical_approval == Some(true),
        "reasonableAmount" => |r| r.is_reasonable_amount == Some(true),
        "followsPolicy" => |r| r.follows_policy == Some(true),

        // Invoice fraud
        "inflatedAmount" | "isInflatedAmount" => |r| r.is_inflated_amount == Some(true),
        "inflatedInvoiceAmount" => {
            |r| r.amount.is_some_and(|a| a > INFLATED_INVOICE_THRESHOLD)
        }
        "genericServices" => |r| r.has_generic_services == Some(true),
        "hasReceipts" => |r| r.has_receipts == Some(true),
        "detailedBreakdown" | "hasDetailedBreakdown" => |r| r.has_detailed_breakdown == Some(true),
        "normalAmount" => |r| r.is_normal_amount == Some(true),
        "properFormatting" => |r| r.has_proper_formatting == Some(true),

        _ => return None,
    };
    Some(predicate)
}

/// Whether `name` triggers against `record`. Unknown names never trigger.
pub fn triggers(name: &str, record: &AttackRecord) -> bool {
    lookup(name).is_some_and(|predicate| predicate(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_resolves_to_none() {
        assert!(lookup("frequentFlyer").is_none());
        assert!(!triggers("frequentFlyer", &AttackRecord::default()));
    }

    #[test]
    fn flag_absent_never_triggers() {
        let record = AttackRecord::default();
        for name in ["newVendor", "hasWebsite", "urgentRequest", "followsPolicy"] {
            assert!(!triggers(name, &record), "{name} fired on empty record");
        }
    }

    #[test]
    fn no_verification_requires_explicit_false() {
        let mut record = AttackRecord::default();
        // Absent is not the same as denied verification.
        assert!(!triggers("noVerification", &record));
        record.has_verification = Some(false);
        assert!(triggers("noVerification", &record));
        assert!(!triggers("verifiedEmployee", &record));
        record.has_verification = Some(true);
        assert!(!triggers("noVerification", &record));
        assert!(triggers("verifiedEmployee", &record));
        assert!(triggers("hasVerification", &record));
    }

    #[test]
    fn no_justification_requires_explicit_false() {
        let mut record = AttackRecord::default();
        assert!(!triggers("noJustification", &record));
        record.has_justification = Some(false);
        assert!(triggers("noJustification", &record));
        assert!(!triggers("hasJustification", &record));
    }

    #[test]
    fn large_amount_boundary() {
        let mut record = AttackRecord::default();
        assert!(!triggers("largeAmount", &record));
        record.amount = Some(10_000.0);
        assert!(!triggers("largeAmount", &record));
        record.amount = Some(10_000.01);
        assert!(triggers("largeAmount", &record));
    }

    #[test]
    fn large_limit_request_boundary() {
        let mut record = AttackRecord::default();
        record.requested_limit = Some(45_000.0);
        assert!(!triggers("largeLimitRequest", &record));
        record.requested_limit = Some(50_000.0);
        assert!(triggers("largeLimitRequest", &record));
    }

    #[test]
    fn inflated_invoice_amount_boundary() {
        let mut record = AttackRecord::default();
        record.amount = Some(7_000.0);
        assert!(!triggers("inflatedInvoiceAmount", &record));
        record.amount = Some(7_500.0);
        assert!(triggers("inflatedInvoiceAmount", &record));
    }

    #[test]
    fn generic_name_substring_match() {
        let mut record = AttackRecord::default();
        assert!(!triggers("genericName", &record));
        record.vendor_name = Some("Acme Manufacturing".to_string());
        assert!(!triggers("genericName", &record));
        for name in ["Tech Solutions LLC", "Global Services Inc", "Premier Consulting Group"] {
            record.vendor_name = Some(name.to_string());
            assert!(triggers("genericName", &record), "{name} not flagged");
        }
    }

    #[test]
    fn round_amount_flag_or_divisibility() {
        let mut record = AttackRecord::default();
        assert!(!triggers("roundAmount", &record));
        record.amount = Some(5_000.0);
        assert!(triggers("roundAmount", &record));
        record.amount = Some(5_137.0);
        assert!(!triggers("roundAmount", &record));
        record.is_round_amount = Some(true);
        assert!(triggers("roundAmount", &record));
        // Zero is not a round amount.
        let record = AttackRecord {
            amount: Some(0.0),
            ..Default::default()
        };
        assert!(!triggers("roundAmount", &record));
    }

    #[test]
    fn alias_names_match_canonical() {
        let record = AttackRecord {
            is_new_vendor: Some(true),
            is_historical_vendor: Some(true),
            is_same_day_request: Some(true),
            ..Default::default()
        };
        assert_eq!(triggers("newVendor", &record), triggers("isNewVendor", &record));
        assert_eq!(
            triggers("historicalVendor", &record),
            triggers("isHistoricalVendor", &record)
        );
        assert_eq!(
            triggers("sameDayRequest", &record),
            triggers("isSameDayRequest", &record)
        );
    }

    #[test]
    fn all_canonical_names_resolve() {
        let names = [
            "newVendor", "largeAmount", "genericName", "hasPhoneNumber", "hasWebsite",
            "hasEmail", "historicalVendor", "roundAmount", "urgentRequest",
            "sameDayRequest", "unknownEmail", "noVerification", "verifiedEmployee",
            "normalHours", "previousChanges", "completeInfo", "followsProcedure",
            "largeIncrease", "noJustification", "urgentReason", "detailedJustification",
            "historicalApproval", "reasonableAmount", "inflatedAmount",
            "genericServices", "hasReceipts", "detailedBreakdown", "normalAmount",
            "properFormatting",
        ];
        for name in names {
            assert!(lookup(name).is_some(), "{name} missing from predicate table");
        }
    }
}
