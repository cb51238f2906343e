use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// The seven recognized loan-extract categories.
///
/// Declaration order is the preferred processing order: when a field is touched by more than
/// one sheet type, the later type in this list wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SheetType {
    #[serde(rename = "Closing Loan Dump")]
    ClosingLoanDump,
    #[serde(rename = "Opening Loan Dump")]
    OpeningLoanDump,
    #[serde(rename = "EMI")]
    Emi,
    #[serde(rename = "Ope Due LIst")]
    OpeDueList,
    #[serde(rename = "Effective closure date")]
    EffectiveClosureDate,
    #[serde(rename = "Early Closure")]
    EarlyClosure,
    #[serde(rename = "Part-Payment")]
    PartPayment,
}

impl SheetType {
    pub const PREFERRED_ORDER: [SheetType; 7] = [
        SheetType::ClosingLoanDump,
        SheetType::OpeningLoanDump,
        SheetType::Emi,
        SheetType::OpeDueList,
        SheetType::EffectiveClosureDate,
        SheetType::EarlyClosure,
        SheetType::PartPayment,
    ];

    /// The label users declare files with.
    pub fn label(&self) -> &'static str {
        match self {
            SheetType::ClosingLoanDump => "Closing Loan Dump",
            SheetType::OpeningLoanDump => "Opening Loan Dump",
            SheetType::Emi => "EMI",
            SheetType::OpeDueList => "Ope Due LIst",
            SheetType::EffectiveClosureDate => "Effective closure date",
            SheetType::EarlyClosure => "Early Closure",
            SheetType::PartPayment => "Part-Payment",
        }
    }

    /// Matches a declared label, ignoring surrounding whitespace and case.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::PREFERRED_ORDER
            .into_iter()
            .find(|sheet_type| sheet_type.label().eq_ignore_ascii_case(wanted))
    }

    /// Position in the preferred processing order.
    pub fn preferred_rank(&self) -> usize {
        Self::PREFERRED_ORDER
            .iter()
            .position(|sheet_type| sheet_type == self)
            .unwrap_or(Self::PREFERRED_ORDER.len())
    }
}

impl fmt::Display for SheetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
