//! Rule-set compilation and composite predicate evaluation.
//!
//! `compile` resolves every rule's field path against the registry, coerces
//! its value text to the field's declared type, and validates operator
//! applicability — all up front, so evaluation is infallible. The compiled
//! predicates combine under the rule set's single shared AND/OR operator.

use dunner_core::{fields, Case, FieldDef, FieldValue, LogicalOp, Operator, Rule};

use crate::coerce::{coerce, split_csv};
use crate::error::RuleError;

// ── Compilation ─────────────────────────────────────────────────────

/// Coerced operand of one compiled rule.
#[derive(Debug)]
enum Operand {
    /// IS_NULL / IS_NOT_NULL: the value text is ignored.
    None,
    One(FieldValue),
    Many(Vec<FieldValue>),
    Range(FieldValue, FieldValue),
}

/// One rule, resolved and coerced.
#[derive(Debug)]
struct RulePredicate {
    def: &'static FieldDef,
    operator: Operator,
    operand: Operand,
}

/// A strategy's rule set compiled into a single boolean test over a case.
#[derive(Debug)]
pub struct CompiledPredicate {
    logical_op: LogicalOp,
    predicates: Vec<RulePredicate>,
}

/// Compile an ordered rule set into a composite predicate.
///
/// The logical operator is taken from the first rule (AND when the set is
/// empty). Any resolution, coercion, or applicability problem is a
/// [`RuleError`] — never a silently-false predicate.
pub fn compile(rules: &[&Rule]) -> Result<CompiledPredicate, RuleError> {
    let logical_op = rules.first().map(|r| r.logical_op).unwrap_or_default();

    let mut predicates = Vec::with_capacity(rules.len());
    for rule in rules {
        predicates.push(compile_rule(rule)?);
    }

    Ok(CompiledPredicate {
        logical_op,
        predicates,
    })
}

/// Validate a rule set without keeping the compiled form. Used at
/// strategy-save time.
pub fn validate_rules(rules: &[Rule]) -> Result<(), RuleError> {
    let refs: Vec<&Rule> = rules.iter().collect();
    compile(&refs).map(|_| ())
}

fn compile_rule(rule: &Rule) -> Result<RulePredicate, RuleError> {
    let def = fields::lookup(&rule.field)
        .ok_or_else(|| RuleError::UnknownField(rule.field.clone()))?;

    let coerce_one = |raw: &str| -> Result<FieldValue, RuleError> {
        coerce(raw, def.field_type).ok_or_else(|| RuleError::Coercion {
            field: rule.field.clone(),
            value: raw.to_string(),
            expected: def.field_type,
        })
    };

    let operand = match rule.operator {
        Operator::IsNull | Operator::IsNotNull => Operand::None,

        Operator::Contains
        | Operator::NotContains
        | Operator::StartsWith
        | Operator::EndsWith => {
            if !def.field_type.is_text() {
                return Err(type_error(rule, def));
            }
            Operand::One(coerce_one(rule.value.trim())?)
        }

        Operator::GreaterThan
        | Operator::GreaterThanOrEqual
        | Operator::LessThan
        | Operator::LessThanOrEqual => {
            if !def.field_type.is_comparable() {
                return Err(type_error(rule, def));
            }
            Operand::One(coerce_one(rule.value.trim())?)
        }

        Operator::Equals | Operator::NotEquals => Operand::One(coerce_one(rule.value.trim())?),

        Operator::In | Operator::NotIn => {
            let tokens = split_csv(&rule.value);
            if tokens.is_empty() || (tokens.len() == 1 && tokens[0].is_empty()) {
                return Err(RuleError::EmptyValueList {
                    field: rule.field.clone(),
                    operator: rule.operator,
                });
            }
            let values = tokens
                .iter()
                .map(|t| coerce_one(t))
                .collect::<Result<Vec<_>, _>>()?;
            Operand::Many(values)
        }

        Operator::Between => {
            if !def.field_type.is_comparable() {
                return Err(type_error(rule, def));
            }
            let tokens = split_csv(&rule.value);
            if tokens.len() != 2 {
                return Err(RuleError::BetweenArity {
                    field: rule.field.clone(),
                    got: tokens.len(),
                });
            }
            Operand::Range(coerce_one(tokens[0])?, coerce_one(tokens[1])?)
        }
    };

    Ok(RulePredicate {
        def,
        operator: rule.operator,
        operand,
    })
}

fn type_error(rule: &Rule, def: &FieldDef) -> RuleError {
    RuleError::OperatorType {
        field: rule.field.clone(),
        operator: rule.operator,
        field_type: def.field_type,
    }
}

// ── Evaluation ──────────────────────────────────────────────────────

impl CompiledPredicate {
    /// Whether the rule set was empty. Callers fall back to "all allocated
    /// cases" rather than evaluating an empty conjunction.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluate the composite predicate against one case.
    pub fn matches(&self, case: &Case) -> bool {
        match self.logical_op {
            LogicalOp::And => self.predicates.iter().all(|p| p.matches(case)),
            LogicalOp::Or => self.predicates.iter().any(|p| p.matches(case)),
        }
    }
}

impl RulePredicate {
    fn matches(&self, case: &Case) -> bool {
        let value = (self.def.accessor)(case);

        // Presence operators look only at presence.
        match self.operator {
            Operator::IsNull => return value.is_none(),
            Operator::IsNotNull => return value.is_some(),
            _ => {}
        }

        // Every other operator fails on an absent attribute, including the
        // negated ones: presence is tested explicitly, never implied.
        let value = match value {
            Some(v) => v,
            None => return false,
        };

        match (&self.operator, &self.operand) {
            (Operator::Equals, Operand::One(expected)) => value.loose_eq(expected),
            (Operator::NotEquals, Operand::One(expected)) => !value.loose_eq(expected),

            (Operator::GreaterThan, Operand::One(bound)) => {
                matches!(value.compare(bound), Some(std::cmp::Ordering::Greater))
            }
            (Operator::GreaterThanOrEqual, Operand::One(bound)) => matches!(
                value.compare(bound),
                Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
            ),
            (Operator::LessThan, Operand::One(bound)) => {
                matches!(value.compare(bound), Some(std::cmp::Ordering::Less))
            }
            (Operator::LessThanOrEqual, Operand::One(bound)) => matches!(
                value.compare(bound),
                Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
            ),

            (Operator::In, Operand::Many(values)) => {
                values.iter().any(|v| value.loose_eq(v))
            }
            (Operator::NotIn, Operand::Many(values)) => {
                !values.iter().any(|v| value.loose_eq(v))
            }

            (Operator::Contains, Operand::One(needle)) => {
                substring_test(&value, needle, |hay, n| hay.contains(n))
            }
            (Operator::NotContains, Operand::One(needle)) => {
                !substring_test(&value, needle, |hay, n| hay.contains(n))
            }
            (Operator::StartsWith, Operand::One(needle)) => {
                substring_test(&value, needle, |hay, n| hay.starts_with(n))
            }
            (Operator::EndsWith, Operand::One(needle)) => {
                substring_test(&value, needle, |hay, n| hay.ends_with(n))
            }

            (Operator::Between, Operand::Range(lo, hi)) => {
                matches!(
                    value.compare(lo),
                    Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
                ) && matches!(
                    value.compare(hi),
                    Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
                )
            }

            // compile_rule never produces these pairings.
            _ => false,
        }
    }
}

/// Case-insensitive substring-family test on string values.
fn substring_test(
    value: &FieldValue,
    needle: &FieldValue,
    test: fn(&str, &str) -> bool,
) -> bool {
    match (value.as_str(), needle.as_str()) {
        (Some(hay), Some(n)) => test(&hay.to_lowercase(), &n.to_lowercase()),
        _ => false,
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dunner_core::{CaseStatus, Customer, Loan};
    use uuid::Uuid;

    fn case(dpd: i64, state: Option<&str>, outstanding: f64) -> Case {
        Case {
            id: Uuid::new_v4(),
            case_number: format!("CS-{dpd}"),
            status: CaseStatus::Allocated,
            language: None,
            allocation_month: None,
            loan: Loan {
                account_number: "LN-1".to_string(),
                product_code: "PL".to_string(),
                branch_code: None,
                dpd,
                bucket: "B1".to_string(),
                total_outstanding: outstanding,
                principal_outstanding: outstanding,
                interest_outstanding: 0.0,
                emi_amount: 1000.0,
                tenure_months: 24,
                disbursal_date: None,
                last_payment_date: None,
            },
            customer: Customer {
                full_name: "Ravi Kumar".to_string(),
                mobile_number: Some("9800000000".to_string()),
                email_address: None,
                state: state.map(str::to_string),
                city: None,
                pincode: None,
                preferred_language: None,
            },
        }
    }

    fn rule(field: &str, operator: Operator, value: &str) -> Rule {
        Rule {
            id: Uuid::new_v4(),
            field: field.to_string(),
            operator,
            value: value.to_string(),
            logical_op: LogicalOp::And,
            active: true,
            sort_order: 0,
        }
    }

    fn compile_one(r: Rule) -> CompiledPredicate {
        compile(&[&r]).unwrap()
    }

    #[test]
    fn between_is_inclusive() {
        let pred = compile_one(rule("loan.dpd", Operator::Between, "30,60"));
        assert!(pred.matches(&case(30, None, 0.0)));
        assert!(pred.matches(&case(45, None, 0.0)));
        assert!(pred.matches(&case(60, None, 0.0)));
        assert!(!pred.matches(&case(29, None, 0.0)));
        assert!(!pred.matches(&case(61, None, 0.0)));
    }

    #[test]
    fn between_arity_is_config_error() {
        let err = compile(&[&rule("loan.dpd", Operator::Between, "30")]).unwrap_err();
        assert!(matches!(err, RuleError::BetweenArity { got: 1, .. }));

        let err = compile(&[&rule("loan.dpd", Operator::Between, "30,60,90")]).unwrap_err();
        assert!(matches!(err, RuleError::BetweenArity { got: 3, .. }));
    }

    #[test]
    fn in_tokens_are_trimmed() {
        let pred = compile_one(rule("customer.state", Operator::In, " MH, KA "));
        assert!(pred.matches(&case(10, Some("MH"), 0.0)));
        assert!(pred.matches(&case(10, Some("KA"), 0.0)));
        assert!(!pred.matches(&case(10, Some("TN"), 0.0)));
    }

    #[test]
    fn not_in_excludes_listed_values() {
        let pred = compile_one(rule("customer.state", Operator::NotIn, "MH,KA"));
        assert!(!pred.matches(&case(10, Some("MH"), 0.0)));
        assert!(pred.matches(&case(10, Some("TN"), 0.0)));
        // Absent state is a no-match, not an implicit "not in".
        assert!(!pred.matches(&case(10, None, 0.0)));
    }

    #[test]
    fn substring_family_is_case_insensitive() {
        let pred = compile_one(rule("customer.fullName", Operator::Contains, "KUMAR"));
        assert!(pred.matches(&case(10, None, 0.0)));

        let pred = compile_one(rule("customer.fullName", Operator::StartsWith, "ravi"));
        assert!(pred.matches(&case(10, None, 0.0)));

        let pred = compile_one(rule("customer.fullName", Operator::EndsWith, "KUMAR"));
        assert!(pred.matches(&case(10, None, 0.0)));

        let pred = compile_one(rule("customer.fullName", Operator::NotContains, "sharma"));
        assert!(pred.matches(&case(10, None, 0.0)));
    }

    #[test]
    fn substring_on_numeric_field_is_config_error() {
        let err = compile(&[&rule("loan.dpd", Operator::Contains, "4")]).unwrap_err();
        assert!(matches!(err, RuleError::OperatorType { .. }));
    }

    #[test]
    fn ordering_on_string_field_is_config_error() {
        let err = compile(&[&rule("customer.state", Operator::GreaterThan, "KA")]).unwrap_err();
        assert!(matches!(err, RuleError::OperatorType { .. }));
    }

    #[test]
    fn unknown_field_is_config_error() {
        let err = compile(&[&rule("loan.doesNotExist", Operator::Equals, "1")]).unwrap_err();
        assert!(matches!(err, RuleError::UnknownField(_)));
    }

    #[test]
    fn coercion_failure_is_config_error() {
        let err = compile(&[&rule("loan.dpd", Operator::Equals, "forty-five")]).unwrap_err();
        assert!(matches!(err, RuleError::Coercion { .. }));
    }

    #[test]
    fn is_null_checks_presence_only() {
        let pred = compile_one(rule("customer.state", Operator::IsNull, "ignored"));
        assert!(pred.matches(&case(10, None, 0.0)));
        assert!(!pred.matches(&case(10, Some("MH"), 0.0)));

        let pred = compile_one(rule("customer.state", Operator::IsNotNull, ""));
        assert!(pred.matches(&case(10, Some("MH"), 0.0)));
        assert!(!pred.matches(&case(10, None, 0.0)));
    }

    #[test]
    fn and_requires_every_rule() {
        let r1 = rule("loan.dpd", Operator::GreaterThanOrEqual, "30");
        let r2 = rule("customer.state", Operator::Equals, "MH");
        let pred = compile(&[&r1, &r2]).unwrap();

        assert!(pred.matches(&case(45, Some("MH"), 0.0)));
        assert!(!pred.matches(&case(45, Some("KA"), 0.0)));
        assert!(!pred.matches(&case(10, Some("MH"), 0.0)));
    }

    #[test]
    fn or_takes_operator_from_first_rule() {
        let mut r1 = rule("loan.dpd", Operator::GreaterThan, "90");
        r1.logical_op = LogicalOp::Or;
        // Second rule's combiner differs; it must be ignored.
        let r2 = rule("customer.state", Operator::Equals, "MH");
        let pred = compile(&[&r1, &r2]).unwrap();

        assert!(pred.matches(&case(120, Some("KA"), 0.0)));
        assert!(pred.matches(&case(10, Some("MH"), 0.0)));
        assert!(!pred.matches(&case(10, Some("KA"), 0.0)));
    }

    #[test]
    fn empty_rule_set_compiles_to_empty_predicate() {
        let pred = compile(&[]).unwrap();
        assert!(pred.is_empty());
        assert!(pred.matches(&case(1, None, 0.0)));
    }

    #[test]
    fn decimal_comparison_on_outstanding() {
        let pred = compile_one(rule(
            "loan.totalOutstanding",
            Operator::GreaterThan,
            "100000",
        ));
        assert!(pred.matches(&case(10, None, 100000.01)));
        assert!(!pred.matches(&case(10, None, 99999.99)));
    }

    #[test]
    fn equals_on_decimal_uses_epsilon() {
        let pred = compile_one(rule("loan.totalOutstanding", Operator::Equals, "0.3"));
        assert!(pred.matches(&case(10, None, 0.1 + 0.2)));
    }

    #[test]
    fn date_fields_support_ordering_and_ranges() {
        use chrono::NaiveDate;

        let mut c = case(10, None, 0.0);
        c.loan.disbursal_date = NaiveDate::from_ymd_opt(2024, 3, 15);

        let pred = compile_one(rule(
            "loan.disbursalDate",
            Operator::Between,
            "2024-01-01, 2024-06-30",
        ));
        assert!(pred.matches(&c));

        let pred = compile_one(rule("loan.disbursalDate", Operator::LessThan, "2024-02-01"));
        assert!(!pred.matches(&c));

        // Absent date fails everything except the presence checks.
        let bare = case(10, None, 0.0);
        let pred = compile_one(rule(
            "loan.disbursalDate",
            Operator::Between,
            "2024-01-01,2024-06-30",
        ));
        assert!(!pred.matches(&bare));
        let pred = compile_one(rule("loan.disbursalDate", Operator::IsNull, ""));
        assert!(pred.matches(&bare));
    }

    #[test]
    fn empty_in_list_is_config_error() {
        let err = compile(&[&rule("customer.state", Operator::In, "")]).unwrap_err();
        assert!(matches!(err, RuleError::EmptyValueList { .. }));
    }
}
