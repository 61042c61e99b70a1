//! Operator semantics over a synthetic case population.
//!
//! Each scenario compiles one rule set and asserts the matched subset is
//! exactly the documented one — nothing extra, nothing missing.

use dunner_core::{Case, CaseStatus, Customer, Loan, LogicalOp, Operator, Rule};
use dunner_rules::compile;
use uuid::Uuid;

fn make_case(num: &str, dpd: i64, bucket: &str, state: Option<&str>, email: Option<&str>) -> Case {
    Case {
        id: Uuid::new_v4(),
        case_number: num.to_string(),
        status: CaseStatus::Allocated,
        language: None,
        allocation_month: None,
        loan: Loan {
            account_number: format!("LN-{num}"),
            product_code: "PL".to_string(),
            branch_code: None,
            dpd,
            bucket: bucket.to_string(),
            total_outstanding: dpd as f64 * 1000.0,
            principal_outstanding: dpd as f64 * 900.0,
            interest_outstanding: dpd as f64 * 100.0,
            emi_amount: 2500.0,
            tenure_months: 36,
            disbursal_date: None,
            last_payment_date: None,
        },
        customer: Customer {
            full_name: format!("Customer {num}"),
            mobile_number: Some("9800000000".to_string()),
            email_address: email.map(str::to_string),
            state: state.map(str::to_string),
            city: None,
            pincode: None,
            preferred_language: None,
        },
    }
}

fn population() -> Vec<Case> {
    vec![
        make_case("C1", 5, "X", Some("MH"), Some("c1@example.com")),
        make_case("C2", 30, "B1", Some("KA"), None),
        make_case("C3", 45, "B2", Some("MH"), Some("c3@example.com")),
        make_case("C4", 60, "B2", None, None),
        make_case("C5", 95, "B3", Some("TN"), Some("c5@example.com")),
    ]
}

fn rule(field: &str, operator: Operator, value: &str, logical_op: LogicalOp) -> Rule {
    Rule {
        id: Uuid::new_v4(),
        field: field.to_string(),
        operator,
        value: value.to_string(),
        logical_op,
        active: true,
        sort_order: 0,
    }
}

fn matched(rules: &[Rule]) -> Vec<String> {
    let refs: Vec<&Rule> = rules.iter().collect();
    let pred = compile(&refs).expect("rules should compile");
    population()
        .iter()
        .filter(|c| pred.matches(c))
        .map(|c| c.case_number.clone())
        .collect()
}

#[test]
fn between_returns_exactly_the_inclusive_range() {
    let got = matched(&[rule("loan.dpd", Operator::Between, "30,60", LogicalOp::And)]);
    assert_eq!(got, vec!["C2", "C3", "C4"]);
}

#[test]
fn equals_and_not_equals_on_bucket() {
    let got = matched(&[rule("loan.bucket", Operator::Equals, "B2", LogicalOp::And)]);
    assert_eq!(got, vec!["C3", "C4"]);

    let got = matched(&[rule("loan.bucket", Operator::NotEquals, "B2", LogicalOp::And)]);
    assert_eq!(got, vec!["C1", "C2", "C5"]);
}

#[test]
fn ordering_operators_partition_the_population() {
    let gt = matched(&[rule("loan.dpd", Operator::GreaterThan, "45", LogicalOp::And)]);
    assert_eq!(gt, vec!["C4", "C5"]);

    let gte = matched(&[rule("loan.dpd", Operator::GreaterThanOrEqual, "45", LogicalOp::And)]);
    assert_eq!(gte, vec!["C3", "C4", "C5"]);

    let lt = matched(&[rule("loan.dpd", Operator::LessThan, "45", LogicalOp::And)]);
    assert_eq!(lt, vec!["C1", "C2"]);

    let lte = matched(&[rule("loan.dpd", Operator::LessThanOrEqual, "45", LogicalOp::And)]);
    assert_eq!(lte, vec!["C1", "C2", "C3"]);
}

#[test]
fn in_with_padded_tokens_matches_trimmed_values() {
    let got = matched(&[rule("customer.state", Operator::In, " MH, KA ", LogicalOp::And)]);
    assert_eq!(got, vec!["C1", "C2", "C3"]);
}

#[test]
fn not_in_skips_absent_values() {
    let got = matched(&[rule("customer.state", Operator::NotIn, "MH", LogicalOp::And)]);
    // C4 has no state at all; absence is not membership in the complement.
    assert_eq!(got, vec!["C2", "C5"]);
}

#[test]
fn null_checks_on_email() {
    let got = matched(&[rule("customer.emailAddress", Operator::IsNull, "", LogicalOp::And)]);
    assert_eq!(got, vec!["C2", "C4"]);

    let got = matched(&[rule("customer.emailAddress", Operator::IsNotNull, "", LogicalOp::And)]);
    assert_eq!(got, vec!["C1", "C3", "C5"]);
}

#[test]
fn and_composition_narrows() {
    let got = matched(&[
        rule("loan.dpd", Operator::GreaterThanOrEqual, "30", LogicalOp::And),
        rule("customer.state", Operator::Equals, "MH", LogicalOp::And),
    ]);
    assert_eq!(got, vec!["C3"]);
}

#[test]
fn or_composition_widens() {
    let got = matched(&[
        rule("loan.dpd", Operator::GreaterThan, "90", LogicalOp::Or),
        rule("loan.bucket", Operator::Equals, "X", LogicalOp::Or),
    ]);
    assert_eq!(got, vec!["C1", "C5"]);
}

#[test]
fn contains_on_product_description_style_field() {
    let got = matched(&[rule(
        "customer.fullName",
        Operator::Contains,
        "customer c",
        LogicalOp::And,
    )]);
    // Case-insensitive: matches every synthetic name.
    assert_eq!(got.len(), 5);
}
