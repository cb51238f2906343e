use crate::{FieldValue, LoanId};
use serde::{Deserialize, Serialize};

/// One (loan, month) line of the billing units report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRow {
    pub loan_id: LoanId,
    pub month_label: String,
    pub principal_billing: f64,
    pub interest_billing: f64,
}

impl BillingRow {
    pub const HEADERS: [&'static str; 4] =
        ["Customer", "Month", "PrincipalBilling", "InterestBilling"];

    pub fn has_billing(&self) -> bool {
        self.principal_billing != 0.0 || self.interest_billing != 0.0
    }

    /// Values in `HEADERS` order; amounts use the same rendering as the loan report.
    pub fn to_row(&self) -> [String; 4] {
        [
            self.loan_id.to_string(),
            self.month_label.clone(),
            FieldValue::Number(self.principal_billing).to_string(),
            FieldValue::Number(self.interest_billing).to_string(),
        ]
    }
}
