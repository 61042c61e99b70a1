//! Case entity graph: a case is one unit of collections work (one
//! delinquent loan) carrying nested loan and customer attributes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a collections case.
///
/// Strategies only ever target `Allocated` cases; the other states exist
/// so the case store can hold the full population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStatus {
    Open,
    Allocated,
    Resolved,
    Closed,
    WrittenOff,
}

/// Loan attributes of a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Lender-side loan account number.
    pub account_number: String,
    /// Product code (e.g., "PL", "TW", "HL").
    pub product_code: String,
    /// Originating branch code.
    pub branch_code: Option<String>,
    /// Days past due.
    pub dpd: i64,
    /// Delinquency bucket label derived from DPD (e.g., "X", "B1", "B2").
    pub bucket: String,
    pub total_outstanding: f64,
    pub principal_outstanding: f64,
    pub interest_outstanding: f64,
    pub emi_amount: f64,
    pub tenure_months: i64,
    /// Date the loan was disbursed.
    pub disbursal_date: Option<NaiveDate>,
    /// Date of the last repayment received, if any.
    pub last_payment_date: Option<NaiveDate>,
}

/// Customer attributes of a case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub full_name: String,
    /// Primary mobile number. Required for SMS and WhatsApp actions.
    pub mobile_number: Option<String>,
    /// Primary email address. Required for email actions.
    pub email_address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub preferred_language: Option<String>,
}

/// One unit of collections work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    /// Human-facing case number (e.g., "CS-2026-000042").
    pub case_number: String,
    pub status: CaseStatus,
    /// Communication language for this case, when it differs from the
    /// customer's preferred language.
    pub language: Option<String>,
    /// Month the case was allocated to an agency/queue ("2026-07").
    pub allocation_month: Option<String>,
    pub loan: Loan,
    pub customer: Customer,
}

impl Case {
    /// Whether the case is currently in the allocated lifecycle state.
    pub fn is_allocated(&self) -> bool {
        self.status == CaseStatus::Allocated
    }
}
