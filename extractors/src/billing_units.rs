//! Billing extract reader.
//!
//! The billing sheet carries one loan per row and one column per (month, billing type), with
//! headers like `March_Principal_2024` or `Mar_Int_2024`. Each row is unpivoted into one
//! [`BillingRow`] per month with a nonzero amount.

use crate::header_resolver::{find_column, HeaderPredicate, HeaderRule, Selection};
use crate::normalize::{normalize_identifier, to_number};
use crate::workbook::{stream_first_sheet, CellValue};
use shared_types::{BillingRow, LoanId, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

const MONTH_NAMES: [(&str, &str); 23] = [
    ("january", "Jan"),
    ("jan", "Jan"),
    ("february", "Feb"),
    ("feb", "Feb"),
    ("march", "Mar"),
    ("mar", "Mar"),
    ("april", "Apr"),
    ("apr", "Apr"),
    ("may", "May"),
    ("june", "Jun"),
    ("jun", "Jun"),
    ("july", "Jul"),
    ("jul", "Jul"),
    ("august", "Aug"),
    ("aug", "Aug"),
    ("september", "Sep"),
    ("sep", "Sep"),
    ("october", "Oct"),
    ("oct", "Oct"),
    ("november", "Nov"),
    ("nov", "Nov"),
    ("december", "Dec"),
    ("dec", "Dec"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CustomerColumn;

const CUSTOMER_COLUMN: [HeaderRule<CustomerColumn>; 1] = [HeaderRule {
    target: CustomerColumn,
    predicates: &[
        HeaderPredicate::ContainsIgnoreCase("customer"),
        HeaderPredicate::ContainsIgnoreCase("lan"),
        HeaderPredicate::ContainsIgnoreCase("loan"),
    ],
}];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingKind {
    Principal,
    Interest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingHeader {
    /// `Mon-YYYY`
    pub month_label: String,
    pub kind: BillingKind,
}

fn month_abbreviation(name: &str) -> Option<&'static str> {
    let lowered = name.to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(full, _)| *full == lowered)
        .map(|(_, abbreviation)| *abbreviation)
}

/// Parses `{month}_{billingtype}_{year}`; anything else is not a billing column.
pub fn parse_billing_header(header: &str) -> Option<BillingHeader> {
    let parts: Vec<&str> = header.trim().split('_').collect();
    let [month, kind, year] = parts.as_slice() else {
        return None;
    };

    let month = month_abbreviation(month)?;
    let kind = kind.to_lowercase();
    let kind = if kind.contains("principal") {
        BillingKind::Principal
    } else if kind.contains("int") {
        BillingKind::Interest
    } else {
        return None;
    };

    Some(BillingHeader {
        month_label: format!("{}-{}", month, year),
        kind,
    })
}

/// Billing columns of one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup {
    pub month_label: String,
    pub principal: Option<usize>,
    pub interest: Option<usize>,
}

/// Groups billing columns by month label, in order of first appearance.
pub fn group_columns_by_month(labels: &[String]) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();

    for (index, label) in labels.iter().enumerate() {
        let Some(header) = parse_billing_header(label) else {
            continue;
        };

        let position = match groups
            .iter()
            .position(|group| group.month_label == header.month_label)
        {
            Some(position) => position,
            None => {
                groups.push(MonthGroup {
                    month_label: header.month_label,
                    principal: None,
                    interest: None,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[position];
        match header.kind {
            BillingKind::Principal => group.principal = Some(index),
            BillingKind::Interest => group.interest = Some(index),
        }
    }

    groups
}

#[derive(Debug, Clone)]
struct BillingLayout {
    customer_column: usize,
    groups: Vec<MonthGroup>,
}

impl BillingLayout {
    fn resolve(cells: &[CellValue]) -> Self {
        let labels: Vec<String> = cells.iter().map(CellValue::label).collect();
        let customer_column =
            find_column(&CUSTOMER_COLUMN, &CustomerColumn, &labels, Selection::LastMatch)
                .unwrap_or(0);

        Self {
            customer_column,
            groups: group_columns_by_month(&labels),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BillingSummary {
    pub sheet_name: String,
    pub month_groups: usize,
    pub rows_read: usize,
    pub rows_emitted: usize,
}

/// Row-by-row unpivot of the billing sheet; the first row pushed is the header.
pub struct BillingAccumulator<'a> {
    allowed: &'a HashSet<LoanId>,
    layout: Option<BillingLayout>,
    summary: BillingSummary,
}

impl<'a> BillingAccumulator<'a> {
    /// An empty `allowed` set keeps every loan.
    pub fn new(allowed: &'a HashSet<LoanId>) -> Self {
        Self {
            allowed,
            layout: None,
            summary: BillingSummary::default(),
        }
    }

    pub fn push_row<F>(&mut self, cells: &[CellValue], mut emit: F) -> Result<()>
    where
        F: FnMut(BillingRow) -> Result<()>,
    {
        if self.layout.is_none() {
            let layout = BillingLayout::resolve(cells);
            self.summary.month_groups = layout.groups.len();
            self.layout = Some(layout);
            return Ok(());
        }
        let Some(layout) = &self.layout else {
            return Ok(());
        };

        self.summary.rows_read += 1;
        let Some(loan_id) = cells
            .get(layout.customer_column)
            .and_then(normalize_identifier)
        else {
            return Ok(());
        };
        if !self.allowed.is_empty() && !self.allowed.contains(&loan_id) {
            return Ok(());
        }

        let amount = |column: Option<usize>| {
            column
                .and_then(|index| cells.get(index))
                .map(to_number)
                .unwrap_or(0.0)
        };

        for group in &layout.groups {
            let row = BillingRow {
                loan_id: loan_id.clone(),
                month_label: group.month_label.clone(),
                principal_billing: amount(group.principal),
                interest_billing: amount(group.interest),
            };
            if row.has_billing() {
                self.summary.rows_emitted += 1;
                emit(row)?;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> BillingSummary {
        self.summary
    }
}

/// Streams the billing sheet at `path`, handing every nonzero (loan, month) row to `on_row`.
pub fn extract_billing_units<F>(
    path: &Path,
    allowed: &HashSet<LoanId>,
    mut on_row: F,
) -> Result<BillingSummary>
where
    F: FnMut(BillingRow) -> Result<()>,
{
    let mut accumulator = BillingAccumulator::new(allowed);
    let sheet_name = stream_first_sheet(path, |row| accumulator.push_row(&row, &mut on_row))?;

    let mut summary = accumulator.finish();
    summary.sheet_name = sheet_name;
    debug!(
        "Billing sheet {:?}: {} month group(s), {} row(s) read, {} billing row(s)",
        path, summary.month_groups, summary.rows_read, summary.rows_emitted
    );
    Ok(summary)
}
