//! Typed field registry for rule targeting.
//!
//! Filter rules reference case attributes by dot-path ("loan.dpd",
//! "customer.state"). The registry is a fixed table mapping each supported
//! path to its declared type and an accessor closure, built once at compile
//! time. Unknown paths are a configuration error at strategy-save time,
//! never a silent false-match at query time.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::case::Case;

/// Declared type of a filterable case attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Integer,
    Long,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
}

impl FieldType {
    /// Whether ordinal comparison (>, >=, <, <=, BETWEEN) is defined for
    /// values of this type.
    pub fn is_comparable(&self) -> bool {
        !matches!(self, FieldType::String | FieldType::Boolean)
    }

    /// Whether substring operators (CONTAINS, STARTS_WITH, ...) apply.
    pub fn is_text(&self) -> bool {
        matches!(self, FieldType::String)
    }
}

/// A coerced attribute value.
///
/// Integer and Long both coerce to `Int`; Double and Decimal both coerce
/// to `Float`. The distinction only matters for coercion diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Equality with epsilon tolerance on floats.
    pub fn loose_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Float(a), FieldValue::Float(b)) => (a - b).abs() <= f64::EPSILON,
            (a, b) => a == b,
        }
    }

    /// Ordinal comparison between two values of the same variant.
    ///
    /// Returns `None` for mixed variants or non-comparable types; callers
    /// treat that as a failed comparison, not a panic.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// The string content, when this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One entry of the field registry.
#[derive(Debug)]
pub struct FieldDef {
    /// Dot-path as written in rules (e.g., "loan.dpd").
    pub path: &'static str,
    pub field_type: FieldType,
    /// Extracts the attribute from a case. `None` means the attribute is
    /// absent on this case (drives IS_NULL / IS_NOT_NULL).
    pub accessor: fn(&Case) -> Option<FieldValue>,
}

macro_rules! str_opt {
    ($path:expr, $($access:tt)+) => {
        FieldDef {
            path: $path,
            field_type: FieldType::String,
            accessor: |c| c.$($access)+.clone().map(FieldValue::Str),
        }
    };
}

/// All filterable attributes, in display order.
pub static FIELDS: &[FieldDef] = &[
    FieldDef {
        path: "case.caseNumber",
        field_type: FieldType::String,
        accessor: |c| Some(FieldValue::Str(c.case_number.clone())),
    },
    str_opt!("case.language", language),
    str_opt!("case.allocationMonth", allocation_month),
    FieldDef {
        path: "loan.accountNumber",
        field_type: FieldType::String,
        accessor: |c| Some(FieldValue::Str(c.loan.account_number.clone())),
    },
    FieldDef {
        path: "loan.productCode",
        field_type: FieldType::String,
        accessor: |c| Some(FieldValue::Str(c.loan.product_code.clone())),
    },
    str_opt!("loan.branchCode", loan.branch_code),
    FieldDef {
        path: "loan.dpd",
        field_type: FieldType::Integer,
        accessor: |c| Some(FieldValue::Int(c.loan.dpd)),
    },
    FieldDef {
        path: "loan.bucket",
        field_type: FieldType::String,
        accessor: |c| Some(FieldValue::Str(c.loan.bucket.clone())),
    },
    FieldDef {
        path: "loan.totalOutstanding",
        field_type: FieldType::Decimal,
        accessor: |c| Some(FieldValue::Float(c.loan.total_outstanding)),
    },
    FieldDef {
        path: "loan.principalOutstanding",
        field_type: FieldType::Decimal,
        accessor: |c| Some(FieldValue::Float(c.loan.principal_outstanding)),
    },
    FieldDef {
        path: "loan.interestOutstanding",
        field_type: FieldType::Decimal,
        accessor: |c| Some(FieldValue::Float(c.loan.interest_outstanding)),
    },
    FieldDef {
        path: "loan.emiAmount",
        field_type: FieldType::Decimal,
        accessor: |c| Some(FieldValue::Float(c.loan.emi_amount)),
    },
    FieldDef {
        path: "loan.tenureMonths",
        field_type: FieldType::Integer,
        accessor: |c| Some(FieldValue::Int(c.loan.tenure_months)),
    },
    FieldDef {
        path: "loan.disbursalDate",
        field_type: FieldType::Date,
        accessor: |c| c.loan.disbursal_date.map(FieldValue::Date),
    },
    FieldDef {
        path: "loan.lastPaymentDate",
        field_type: FieldType::Date,
        accessor: |c| c.loan.last_payment_date.map(FieldValue::Date),
    },
    FieldDef {
        path: "customer.fullName",
        field_type: FieldType::String,
        accessor: |c| Some(FieldValue::Str(c.customer.full_name.clone())),
    },
    str_opt!("customer.mobileNumber", customer.mobile_number),
    str_opt!("customer.emailAddress", customer.email_address),
    str_opt!("customer.state", customer.state),
    str_opt!("customer.city", customer.city),
    str_opt!("customer.pincode", customer.pincode),
    str_opt!("customer.preferredLanguage", customer.preferred_language),
];

/// Look up a field definition by its dot-path.
pub fn lookup(path: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|f| f.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{Case, CaseStatus, Customer, Loan};
    use uuid::Uuid;

    fn sample_case() -> Case {
        Case {
            id: Uuid::new_v4(),
            case_number: "CS-2026-000001".to_string(),
            status: CaseStatus::Allocated,
            language: None,
            allocation_month: Some("2026-07".to_string()),
            loan: Loan {
                account_number: "LN-100".to_string(),
                product_code: "PL".to_string(),
                branch_code: None,
                dpd: 45,
                bucket: "B2".to_string(),
                total_outstanding: 125_000.50,
                principal_outstanding: 110_000.0,
                interest_outstanding: 15_000.50,
                emi_amount: 4_200.0,
                tenure_months: 36,
                disbursal_date: None,
                last_payment_date: None,
            },
            customer: Customer {
                full_name: "Asha Rao".to_string(),
                mobile_number: Some("9812345678".to_string()),
                email_address: None,
                state: Some("KA".to_string()),
                city: None,
                pincode: Some("560001".to_string()),
                preferred_language: None,
            },
        }
    }

    #[test]
    fn lookup_resolves_known_paths() {
        let case = sample_case();

        let dpd = lookup("loan.dpd").unwrap();
        assert_eq!(dpd.field_type, FieldType::Integer);
        assert_eq!((dpd.accessor)(&case), Some(FieldValue::Int(45)));

        let state = lookup("customer.state").unwrap();
        assert_eq!(state.field_type, FieldType::String);
        assert_eq!(
            (state.accessor)(&case),
            Some(FieldValue::Str("KA".to_string()))
        );
    }

    #[test]
    fn lookup_rejects_unknown_path() {
        assert!(lookup("loan.nonexistent").is_none());
        assert!(lookup("dpd").is_none());
    }

    #[test]
    fn absent_attribute_yields_none() {
        let case = sample_case();
        let email = lookup("customer.emailAddress").unwrap();
        assert_eq!((email.accessor)(&case), None);
    }

    #[test]
    fn float_equality_uses_epsilon() {
        let a = FieldValue::Float(0.1 + 0.2);
        let b = FieldValue::Float(0.3);
        assert!(a.loose_eq(&b));
    }

    #[test]
    fn compare_is_none_across_variants() {
        assert!(FieldValue::Int(1).compare(&FieldValue::Str("1".into())).is_none());
    }

    #[test]
    fn registry_paths_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for f in FIELDS {
            assert!(seen.insert(f.path), "duplicate path {}", f.path);
        }
    }
}
