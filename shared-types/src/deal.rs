use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized loan account number, the join key across every input file.
///
/// Always trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    /// Returns `None` when the value trims to nothing.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LoanId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated `YYYY-MM` collection month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionMonth {
    year: i32,
    month: u32,
}

impl CollectionMonth {
    pub fn parse(input: &str) -> Option<Self> {
        let (year, month) = input.trim().split_once('-')?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return None;
        }
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The month after this one.
    pub fn next(&self) -> Self {
        let next = self
            .first_day()
            .checked_add_months(chrono::Months::new(1))
            .unwrap_or_else(|| self.first_day());
        Self {
            year: next.year(),
            month: next.month(),
        }
    }

    /// `YYYY_MM`, the prefix of every output file of a run.
    pub fn file_stem(&self) -> String {
        format!("{:04}_{:02}", self.year, self.month)
    }
}

impl fmt::Display for CollectionMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A named group of loans sharing a collection month and payout day.
#[derive(Debug, Clone, PartialEq)]
pub struct Deal {
    pub name: String,
    pub loan_ids: Vec<LoanId>,
    pub collection_month: CollectionMonth,
    pub payout_day: u32,
}

impl Deal {
    pub fn new(name: impl Into<String>, collection_month: CollectionMonth, payout_day: u32) -> Self {
        Self {
            name: name.into(),
            loan_ids: Vec::new(),
            collection_month,
            payout_day,
        }
    }

    /// Adds a loan unless it is already a member. Returns whether it was added.
    pub fn add_loan(&mut self, loan_id: LoanId) -> bool {
        if self.loan_ids.contains(&loan_id) {
            return false;
        }
        self.loan_ids.push(loan_id);
        true
    }
}
