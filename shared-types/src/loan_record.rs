use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed column schema of the loan report, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StandardField {
    DealName,
    LanNo,
    CustomerId,
    CollectionMonth,
    CurrentPayoutDate,
    BankRoi,
    CustomerRoi,
    OpeningPrincipal,
    OpeningPrincipalOverdue,
    OpeningInterestOverdue,
    OpeningOverdue,
    CustomerBilling,
    BillingPrincipal,
    BillingInterest,
    BillingPrepayment,
    Charges,
    OverdueInterest,
    OverduePrincipal,
    CurrentInterest,
    CurrentPrincipal,
    Prepayment,
    CurrentCharges,
    OtherPrincipalPaidAssignee,
    OtherInterestPaidAssignee,
    CustomerCollections,
    ClosingPrincipal,
    InputClosingInterestOverdue,
    InputClosingPrincipalOverdue,
    InputClosingOverdue,
    PrincipalSharePaidToAssignee,
    InterestSharePaidToAssignee,
    ChargeSharePaidToAssignee,
    DpdDays,
    LegalAction,
    Status,
}

impl StandardField {
    pub const ALL: [StandardField; 35] = [
        StandardField::DealName,
        StandardField::LanNo,
        StandardField::CustomerId,
        StandardField::CollectionMonth,
        StandardField::CurrentPayoutDate,
        StandardField::BankRoi,
        StandardField::CustomerRoi,
        StandardField::OpeningPrincipal,
        StandardField::OpeningPrincipalOverdue,
        StandardField::OpeningInterestOverdue,
        StandardField::OpeningOverdue,
        StandardField::CustomerBilling,
        StandardField::BillingPrincipal,
        StandardField::BillingInterest,
        StandardField::BillingPrepayment,
        StandardField::Charges,
        StandardField::OverdueInterest,
        StandardField::OverduePrincipal,
        StandardField::CurrentInterest,
        StandardField::CurrentPrincipal,
        StandardField::Prepayment,
        StandardField::CurrentCharges,
        StandardField::OtherPrincipalPaidAssignee,
        StandardField::OtherInterestPaidAssignee,
        StandardField::CustomerCollections,
        StandardField::ClosingPrincipal,
        StandardField::InputClosingInterestOverdue,
        StandardField::InputClosingPrincipalOverdue,
        StandardField::InputClosingOverdue,
        StandardField::PrincipalSharePaidToAssignee,
        StandardField::InterestSharePaidToAssignee,
        StandardField::ChargeSharePaidToAssignee,
        StandardField::DpdDays,
        StandardField::LegalAction,
        StandardField::Status,
    ];

    /// Column header used in the loan report.
    pub fn header(&self) -> &'static str {
        match self {
            StandardField::DealName => "Deal Name",
            StandardField::LanNo => "lanNo",
            StandardField::CustomerId => "Customer ID",
            StandardField::CollectionMonth => "Collection Month",
            StandardField::CurrentPayoutDate => "Current Payout Date",
            StandardField::BankRoi => "Bank ROI",
            StandardField::CustomerRoi => "Customer ROI",
            StandardField::OpeningPrincipal => "Opening Principal",
            StandardField::OpeningPrincipalOverdue => "Opening Principal Overdue",
            StandardField::OpeningInterestOverdue => "Opening Interest Overdue",
            StandardField::OpeningOverdue => "Opening Overdue",
            StandardField::CustomerBilling => "Customer Billing",
            StandardField::BillingPrincipal => "Billing Principal",
            StandardField::BillingInterest => "Billing Interest",
            StandardField::BillingPrepayment => "Billing Prepayment",
            StandardField::Charges => "Charges",
            StandardField::OverdueInterest => "Overdue Interest",
            StandardField::OverduePrincipal => "Overdue Principal",
            StandardField::CurrentInterest => "Current Interest",
            StandardField::CurrentPrincipal => "Current Principal",
            StandardField::Prepayment => "Prepayment",
            StandardField::CurrentCharges => "Current Charges",
            StandardField::OtherPrincipalPaidAssignee => "Other Principal Paid (Assignee)",
            StandardField::OtherInterestPaidAssignee => "Other Interest Paid (Assignee)",
            StandardField::CustomerCollections => "Customer Collections",
            StandardField::ClosingPrincipal => "Closing Principal",
            StandardField::InputClosingInterestOverdue => "Input Closing Interest Overdue",
            StandardField::InputClosingPrincipalOverdue => "Input Closing Principal Overdue",
            StandardField::InputClosingOverdue => "Input Closing Overdue",
            StandardField::PrincipalSharePaidToAssignee => "Principal Share Paid To Assignee",
            StandardField::InterestSharePaidToAssignee => "Interest Share Paid To Assignee",
            StandardField::ChargeSharePaidToAssignee => "Charge Share Paid To Assignee",
            StandardField::DpdDays => "DPD Days",
            StandardField::LegalAction => "Legal Action taken by the company",
            StandardField::Status => "Status",
        }
    }

    pub fn headers() -> Vec<&'static str> {
        Self::ALL.iter().map(|field| field.header()).collect()
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Parses text the lenient way every amount column is read: trimmed, and anything that is
/// not a finite number counts as 0.
pub fn number_from_text(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// A single cell of the canonical record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn zero() -> Self {
        FieldValue::Number(0.0)
    }

    /// Empty values never overwrite a field during a merge.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.is_empty())
    }

    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(value) if value.is_finite() => *value,
            FieldValue::Number(_) => 0.0,
            FieldValue::Text(text) => number_from_text(text),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // -0 prints as 0
            FieldValue::Number(value) if *value == 0.0 => f.write_str("0"),
            FieldValue::Number(value) => write!(f, "{}", value),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Active,
    Prepayment,
    #[serde(rename = "Written-off")]
    WrittenOff,
}

impl LoanStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Active => "Active",
            LoanStatus::Prepayment => "Prepayment",
            LoanStatus::WrittenOff => "Written-off",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the loan report: a value for every standard field.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    values: Vec<FieldValue>,
}

impl LoanRecord {
    /// A record with every numeric field at 0 and every text field at its blank default.
    pub fn blank() -> Self {
        let values = StandardField::ALL
            .iter()
            .map(|field| match field {
                StandardField::DealName
                | StandardField::LanNo
                | StandardField::CustomerId
                | StandardField::CollectionMonth
                | StandardField::CurrentPayoutDate
                | StandardField::LegalAction => FieldValue::text(""),
                StandardField::BankRoi | StandardField::CustomerRoi => FieldValue::text("0%"),
                StandardField::Status => FieldValue::text(LoanStatus::Active.label()),
                _ => FieldValue::zero(),
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, field: StandardField) -> &FieldValue {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: StandardField, value: impl Into<FieldValue>) {
        self.values[field.index()] = value.into();
    }

    pub fn number(&self, field: StandardField) -> f64 {
        self.get(field).as_number()
    }

    /// Values rendered in report column order.
    pub fn to_row(&self) -> Vec<String> {
        self.values.iter().map(|value| value.to_string()).collect()
    }
}

impl Default for LoanRecord {
    fn default() -> Self {
        Self::blank()
    }
}
