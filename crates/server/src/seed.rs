//! Synthetic case population for demos and local development.
//!
//! The engine never writes cases, so a fresh in-memory deployment has an
//! empty population; `--seed-cases N` fills it with a varied spread of
//! DPD, geography, and contact completeness.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use dunner_core::{Case, CaseStatus, Customer, Loan};

const STATES: &[&str] = &["MH", "KA", "TN", "DL", "GJ", "WB"];
const PRODUCTS: &[&str] = &["PL", "TW", "HL", "BL"];
const FIRST_NAMES: &[&str] = &["Asha", "Ravi", "Neha", "Vikram", "Priya", "Arjun", "Meera", "Karan"];
const LAST_NAMES: &[&str] = &["Rao", "Kumar", "Shah", "Iyer", "Patel", "Das"];

fn bucket_for(dpd: i64) -> &'static str {
    match dpd {
        0..=29 => "X",
        30..=59 => "B1",
        60..=89 => "B2",
        90..=179 => "B3",
        _ => "NPA",
    }
}

/// Generate `n` allocated demo cases. Deterministic in `n`, varied enough
/// to exercise every operator: roughly one in seven has no mobile number
/// and one in three no email.
pub fn demo_cases(n: usize) -> Vec<Case> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default();

    (0..n)
        .map(|i| {
            let dpd = ((i * 13) % 220) as i64;
            let principal = 20_000.0 + (i % 50) as f64 * 9_500.0;
            let interest = principal * 0.011 * (dpd as f64 / 30.0).max(0.0);
            let full_name = format!(
                "{} {}",
                FIRST_NAMES[i % FIRST_NAMES.len()],
                LAST_NAMES[i % LAST_NAMES.len()]
            );

            Case {
                id: Uuid::new_v4(),
                case_number: format!("CS-2026-{:06}", i + 1),
                status: CaseStatus::Allocated,
                language: None,
                allocation_month: Some("2026-07".to_string()),
                loan: Loan {
                    account_number: format!("LN{:08}", 31_000_000 + i),
                    product_code: PRODUCTS[i % PRODUCTS.len()].to_string(),
                    branch_code: Some(format!("BR{:03}", i % 40)),
                    dpd,
                    bucket: bucket_for(dpd).to_string(),
                    total_outstanding: principal + interest,
                    principal_outstanding: principal,
                    interest_outstanding: interest,
                    emi_amount: principal / 36.0,
                    tenure_months: 36,
                    disbursal_date: base_date.checked_add_days(Days::new((i % 400) as u64)),
                    last_payment_date: if dpd > 150 {
                        None
                    } else {
                        base_date.checked_add_days(Days::new(600 + (i % 90) as u64))
                    },
                },
                customer: Customer {
                    full_name,
                    mobile_number: if i % 7 == 3 {
                        None
                    } else {
                        Some(format!("98{:08}", 10_000_000 + i * 17))
                    },
                    email_address: if i % 3 == 1 {
                        None
                    } else {
                        Some(format!("customer{}@example.com", i + 1))
                    },
                    state: Some(STATES[i % STATES.len()].to_string()),
                    city: None,
                    pincode: Some(format!("{:06}", 400_001 + (i % 600))),
                    preferred_language: None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_seeded_case_is_allocated() {
        let cases = demo_cases(50);
        assert_eq!(cases.len(), 50);
        assert!(cases.iter().all(|c| c.status == CaseStatus::Allocated));
    }

    #[test]
    fn seed_includes_contact_gaps() {
        let cases = demo_cases(100);
        assert!(cases.iter().any(|c| c.customer.mobile_number.is_none()));
        assert!(cases.iter().any(|c| c.customer.email_address.is_none()));
        assert!(cases.iter().any(|c| c.customer.mobile_number.is_some()));
    }

    #[test]
    fn buckets_follow_dpd() {
        for case in demo_cases(40) {
            match case.loan.dpd {
                0..=29 => assert_eq!(case.loan.bucket, "X"),
                30..=59 => assert_eq!(case.loan.bucket, "B1"),
                60..=89 => assert_eq!(case.loan.bucket, "B2"),
                90..=179 => assert_eq!(case.loan.bucket, "B3"),
                _ => assert_eq!(case.loan.bucket, "NPA"),
            }
        }
    }
}
