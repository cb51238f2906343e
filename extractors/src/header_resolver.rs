//! Locating columns by header label.
//!
//! Every source file names its columns a little differently, so columns are found through
//! small rule tables rather than hard-coded positions. A rule lists the predicates a label
//! may satisfy; a [`Selection`] decides which of several matching columns wins.

use crate::normalize::MonthYear;
use crate::workbook::{CellValue, EMPTY_CELL};
use shared_types::StandardField;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPredicate {
    /// Trimmed label equals the text exactly.
    Exact(&'static str),
    EqualsIgnoreCase(&'static str),
    ContainsIgnoreCase(&'static str),
}

impl HeaderPredicate {
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        match self {
            HeaderPredicate::Exact(text) => label == *text,
            HeaderPredicate::EqualsIgnoreCase(text) => label.eq_ignore_ascii_case(text),
            HeaderPredicate::ContainsIgnoreCase(text) => label
                .to_lowercase()
                .contains(text.to_lowercase().as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    FirstMatch,
    LastMatch,
}

#[derive(Debug, Clone, Copy)]
pub struct HeaderRule<T> {
    pub target: T,
    pub predicates: &'static [HeaderPredicate],
}

impl<T> HeaderRule<T> {
    pub fn matches(&self, label: &str) -> bool {
        self.predicates.iter().any(|predicate| predicate.matches(label))
    }
}

/// Column index of the label satisfying the rule for `target`, per `selection`.
pub fn find_column<T: PartialEq>(
    rules: &[HeaderRule<T>],
    target: &T,
    labels: &[String],
    selection: Selection,
) -> Option<usize> {
    let rule = rules.iter().find(|rule| rule.target == *target)?;
    let mut matching = labels
        .iter()
        .enumerate()
        .filter(|(_, label)| !label.is_empty() && rule.matches(label))
        .map(|(index, _)| index);

    match selection {
        Selection::FirstMatch => matching.next(),
        Selection::LastMatch => matching.last(),
    }
}

/// Month-specific amount columns of an instalment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthColumn {
    Principal,
    Interest,
}

impl MonthColumn {
    /// Header suffixes tried in priority order.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            MonthColumn::Principal => &["Principal", "principal"],
            MonthColumn::Interest => &["Int", "int", "Interest", "interest"],
        }
    }
}

/// Binds a month-specific column to the record field it fills.
#[derive(Debug, Clone, Copy)]
pub struct MonthFieldRule {
    pub column: MonthColumn,
    pub field: StandardField,
}

/// Lowercased labels `{month}_{suffix}_{year}` and `{mon}_{suffix}_{year}`.
fn month_column_candidates(month: &MonthYear, suffix: &str) -> Vec<String> {
    let mut candidates = vec![
        format!("{}_{}_{}", month.month_name, suffix, month.year).to_lowercase(),
        format!("{}_{}_{}", month.abbreviation(), suffix, month.year).to_lowercase(),
    ];
    candidates.dedup();
    candidates
}

/// Finds the column holding `column` amounts for the collection month.
///
/// Suffixes are tried in priority order; for each suffix the first label in column order
/// that matches wins.
pub fn find_month_column(
    labels: &[String],
    month: &MonthYear,
    column: MonthColumn,
) -> Option<usize> {
    column.suffixes().iter().find_map(|suffix| {
        let candidates = month_column_candidates(month, suffix);
        labels.iter().position(|label| {
            let lowered = label.to_lowercase();
            candidates.iter().any(|candidate| *candidate == lowered)
        })
    })
}

/// Resolved header row of one sheet: labels, the lookup by label and the column each
/// record field is read from.
#[derive(Debug, Clone)]
pub struct SheetHeader {
    labels: Vec<String>,
    by_label: HashMap<String, usize>,
    fields: Vec<(StandardField, Option<usize>)>,
    month_columns: HashMap<MonthColumn, usize>,
}

impl SheetHeader {
    /// Resolves `renames` (every field is kept, even when its column is missing) and the
    /// month-specific fields that can be found for `month`.
    pub fn resolve(
        cells: &[CellValue],
        renames: &[HeaderRule<StandardField>],
        month_fields: &[MonthFieldRule],
        month: &MonthYear,
    ) -> Self {
        let labels: Vec<String> = cells.iter().map(CellValue::label).collect();

        let mut by_label = HashMap::new();
        for (index, label) in labels.iter().enumerate() {
            if !label.is_empty() {
                // later duplicates win
                by_label.insert(label.clone(), index);
            }
        }

        let mut fields: Vec<(StandardField, Option<usize>)> = renames
            .iter()
            .map(|rule| {
                let column = find_column(renames, &rule.target, &labels, Selection::LastMatch);
                (rule.target, column)
            })
            .collect();

        let mut month_columns = HashMap::new();
        for rule in month_fields {
            if let Some(index) = find_month_column(&labels, month, rule.column) {
                month_columns.insert(rule.column, index);
                if !fields.iter().any(|(field, _)| *field == rule.field) {
                    fields.push((rule.field, Some(index)));
                }
            }
        }

        Self {
            labels,
            by_label,
            fields,
            month_columns,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn column(&self, label: &str) -> Option<usize> {
        self.by_label.get(label.trim()).copied()
    }

    pub fn fields(&self) -> &[(StandardField, Option<usize>)] {
        &self.fields
    }

    pub fn month_column(&self, column: MonthColumn) -> Option<usize> {
        self.month_columns.get(&column).copied()
    }
}

/// One data row seen through its sheet's header.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    header: &'a SheetHeader,
    cells: &'a [CellValue],
}

impl<'a> RowView<'a> {
    pub fn new(header: &'a SheetHeader, cells: &'a [CellValue]) -> Self {
        Self { header, cells }
    }

    pub fn cell(&self, column: Option<usize>) -> &'a CellValue {
        column
            .and_then(|index| self.cells.get(index))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cell under the header `label`; empty when the sheet has no such column.
    pub fn get(&self, label: &str) -> &'a CellValue {
        self.cell(self.header.column(label))
    }

    pub fn month_value(&self, column: MonthColumn) -> &'a CellValue {
        self.cell(self.header.month_column(column))
    }
}
