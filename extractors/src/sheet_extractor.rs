//! Turns one loan-extract sheet into partial records for the requested loans.

use crate::header_resolver::{RowView, SheetHeader};
use crate::normalize::{normalize_identifier, MonthYear};
use crate::sheet_config::SheetConfig;
use crate::workbook::{stream_first_sheet_with, CellValue};
use shared_types::{FieldValue, LoanId, Result, SheetType, StandardField};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Fields one sheet touched for one loan. Absent keys are "not set".
pub type PartialRecord = BTreeMap<StandardField, FieldValue>;

#[derive(Debug, Default)]
pub struct SheetExtraction {
    pub sheet_name: String,
    pub records: BTreeMap<LoanId, PartialRecord>,
    pub rows_read: usize,
    pub rows_matched: usize,
}

/// Row-by-row accumulator; the first row pushed is the header.
pub struct SheetAccumulator<'a> {
    config: &'static SheetConfig,
    wanted: &'a HashSet<LoanId>,
    month: &'a MonthYear,
    header: Option<SheetHeader>,
    extraction: SheetExtraction,
}

impl<'a> SheetAccumulator<'a> {
    pub fn new(sheet_type: SheetType, wanted: &'a HashSet<LoanId>, month: &'a MonthYear) -> Self {
        Self {
            config: SheetConfig::for_sheet_type(sheet_type),
            wanted,
            month,
            header: None,
            extraction: SheetExtraction::default(),
        }
    }

    pub fn push_row(&mut self, cells: Vec<CellValue>) {
        if self.header.is_none() {
            self.header = Some(SheetHeader::resolve(
                &cells,
                self.config.renames,
                self.config.month_fields,
                self.month,
            ));
            return;
        }
        let Some(header) = &self.header else {
            return;
        };

        self.extraction.rows_read += 1;
        let row = RowView::new(header, &cells);

        let Some(loan_id) = normalize_identifier(row.get(self.config.key_column)) else {
            return;
        };
        if !self.wanted.contains(&loan_id) {
            return;
        }
        self.extraction.rows_matched += 1;

        let record = self.extraction.records.entry(loan_id).or_default();
        for (field, column) in header.fields() {
            apply_value(record, *field, row.cell(*column).to_field_value());
        }
        for rule in self.config.computed {
            apply_value(record, rule.field, computed_value((rule.compute)(&row)));
        }
    }

    pub fn finish(self) -> SheetExtraction {
        self.extraction
    }
}

/// Falsy numbers become 0; an empty string counts as no value.
fn computed_value(value: FieldValue) -> Option<FieldValue> {
    match value {
        FieldValue::Number(number) if number.is_nan() => Some(FieldValue::zero()),
        value if value.is_empty() => None,
        value => Some(value),
    }
}

/// A value overwrites; no value sets 0 only if this sheet has not set the field yet.
fn apply_value(record: &mut PartialRecord, field: StandardField, value: Option<FieldValue>) {
    match value {
        Some(value) => {
            record.insert(field, value);
        }
        None => {
            record.entry(field).or_insert_with(FieldValue::zero);
        }
    }
}

/// Streams the first worksheet of `path` as `sheet_type`, keeping only loans in `wanted`.
///
/// `on_sheet` receives the worksheet name before any row is read.
pub fn extract_sheet(
    path: &Path,
    sheet_type: SheetType,
    wanted: &HashSet<LoanId>,
    month: &MonthYear,
    on_sheet: impl FnOnce(&str),
) -> Result<SheetExtraction> {
    let mut accumulator = SheetAccumulator::new(sheet_type, wanted, month);
    let sheet_name = stream_first_sheet_with(path, on_sheet, |row| {
        accumulator.push_row(row);
        Ok(())
    })?;

    let mut extraction = accumulator.finish();
    extraction.sheet_name = sheet_name;
    debug!(
        "Extracted {} loan(s) from {} row(s) of {:?} as {}",
        extraction.records.len(),
        extraction.rows_read,
        path,
        sheet_type
    );
    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use shared_types::CollectionMonth;
    use std::fs;
    use tempfile::TempDir;

    fn cells(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from_text(v)).collect()
    }

    fn wanted(ids: &[&str]) -> HashSet<LoanId> {
        ids.iter().filter_map(|id| LoanId::new(id)).collect()
    }

    fn march() -> MonthYear {
        MonthYear::new(CollectionMonth::parse("2024-03").unwrap())
    }

    fn id(raw: &str) -> LoanId {
        LoanId::new(raw).unwrap()
    }

    #[test]
    fn test_closing_dump_rows() {
        let ids = wanted(&["A1", "A2"]);
        let month = march();
        let mut acc = SheetAccumulator::new(SheetType::ClosingLoanDump, &ids, &month);
        acc.push_row(cells(&["Loan Number", "Total POS", "Overdue POS", "Overdue Interest"]));
        acc.push_row(cells(&[" A1 ", "0", "", "50"]));
        acc.push_row(cells(&["B9", "100", "1", "1"]));
        acc.push_row(cells(&["", "100", "1", "1"]));
        let extraction = acc.finish();

        assert_eq!(extraction.rows_read, 3);
        assert_eq!(extraction.rows_matched, 1);
        assert_eq!(extraction.records.len(), 1);

        let record = &extraction.records[&id("A1")];
        assert_eq!(record[&StandardField::ClosingPrincipal], FieldValue::text("0"));
        assert_eq!(record[&StandardField::InputClosingPrincipalOverdue], FieldValue::zero());
        assert_eq!(record[&StandardField::InputClosingInterestOverdue], FieldValue::text("50"));
        assert_eq!(record[&StandardField::InputClosingOverdue], FieldValue::Number(50.0));
        // no DPD column: defaulted once
        assert_eq!(record[&StandardField::DpdDays], FieldValue::zero());
    }

    #[test]
    fn test_empty_value_never_replaces_earlier_value() {
        let ids = wanted(&["A1"]);
        let month = march();
        let mut acc = SheetAccumulator::new(SheetType::PartPayment, &ids, &month);
        acc.push_row(cells(&["LOAN NO", "PREPAYMENT AMOUNT", "Early Closure Date"]));
        acc.push_row(cells(&["A1", "5000", "45000"]));
        acc.push_row(cells(&["A1", "", ""]));
        let extraction = acc.finish();

        let record = &extraction.records[&id("A1")];
        assert_eq!(record[&StandardField::BillingPrepayment], FieldValue::text("5000"));
        assert_eq!(record[&StandardField::CurrentPayoutDate], FieldValue::text("15-03-2023"));
    }

    #[test]
    fn test_later_rows_overwrite() {
        let ids = wanted(&["A1"]);
        let month = march();
        let mut acc = SheetAccumulator::new(SheetType::OpeningLoanDump, &ids, &month);
        acc.push_row(cells(&["Loan Number", "Total POS"]));
        acc.push_row(cells(&["A1", "100"]));
        acc.push_row(cells(&["A1", "200"]));
        let extraction = acc.finish();

        let record = &extraction.records[&id("A1")];
        assert_eq!(record[&StandardField::OpeningPrincipal], FieldValue::text("200"));
    }

    #[test]
    fn test_duplicate_header_rightmost_wins() {
        let ids = wanted(&["A1"]);
        let month = march();
        let mut acc = SheetAccumulator::new(SheetType::OpeningLoanDump, &ids, &month);
        acc.push_row(cells(&["Loan Number", "Total POS", "Total POS"]));
        acc.push_row(cells(&["A1", "100", "300"]));
        let extraction = acc.finish();

        let record = &extraction.records[&id("A1")];
        assert_eq!(record[&StandardField::OpeningPrincipal], FieldValue::text("300"));
    }

    #[test]
    fn test_emi_without_month_columns() {
        let ids = wanted(&["A1"]);
        let month = march();
        let mut acc = SheetAccumulator::new(SheetType::Emi, &ids, &month);
        acc.push_row(cells(&["loan_no", "Feb_Principal_2024"]));
        acc.push_row(cells(&["A1", "100"]));
        let extraction = acc.finish();

        let record = &extraction.records[&id("A1")];
        assert!(!record.contains_key(&StandardField::BillingPrincipal));
        assert_eq!(record[&StandardField::CustomerBilling], FieldValue::Number(0.0));
    }

    #[test]
    fn test_extract_sheet_from_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emi.csv");
        fs::write(
            &path,
            "loan_no,Mar_Principal_2024,Mar_Int_2024\nA1,1000,200\nA2,5,5\n",
        )
        .unwrap();

        let extraction = extract_sheet(&path, SheetType::Emi, &wanted(&["A1"]), &march(), |_| {}).unwrap();

        assert_eq!(extraction.sheet_name, "emi");
        assert_eq!(extraction.records.len(), 1);
        let record = &extraction.records[&id("A1")];
        assert_eq!(record[&StandardField::BillingPrincipal], FieldValue::text("1000"));
        assert_eq!(record[&StandardField::BillingInterest], FieldValue::text("200"));
        assert_eq!(record[&StandardField::CustomerBilling], FieldValue::Number(1200.0));
    }

    #[test]
    fn test_extract_sheet_from_xlsx() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("closing.xlsx");

        let mut workbook = Workbook::new();
        let dump = workbook.add_worksheet();
        let header = ["Loan Number", "Total POS", "Overdue POS", "Overdue Interest", "DPD"];
        for (column, label) in header.iter().enumerate() {
            dump.write_string(0, column as u16, *label).unwrap();
        }
        for (column, value) in [12345.0, 1000.0, 50.0, 5.0].iter().enumerate() {
            dump.write_number(1, column as u16, *value).unwrap();
        }
        dump.write_string(2, 0, "A2").unwrap();
        dump.write_number(2, 4, 30.0).unwrap();
        let stale = workbook.add_worksheet();
        stale.write_string(0, 0, "Loan Number").unwrap();
        stale.write_string(1, 0, "B7").unwrap();
        workbook.save(&path).unwrap();

        let mut announced = None;
        let extraction = extract_sheet(
            &path,
            SheetType::ClosingLoanDump,
            &wanted(&["12345", "A2", "B7"]),
            &march(),
            |sheet| announced = Some(sheet.to_string()),
        )
        .unwrap();

        assert_eq!(announced.as_deref(), Some("Sheet1"));
        assert_eq!(extraction.sheet_name, "Sheet1");
        assert_eq!(extraction.records.len(), 2);
        assert!(!extraction.records.contains_key(&id("B7")));

        let numeric = &extraction.records[&id("12345")];
        assert_eq!(numeric[&StandardField::ClosingPrincipal], FieldValue::Number(1000.0));
        assert_eq!(numeric[&StandardField::InputClosingOverdue], FieldValue::Number(55.0));
        assert_eq!(numeric[&StandardField::DpdDays], FieldValue::zero());

        let sparse = &extraction.records[&id("A2")];
        assert_eq!(sparse[&StandardField::DpdDays], FieldValue::Number(30.0));
        assert_eq!(sparse[&StandardField::ClosingPrincipal], FieldValue::zero());
        assert_eq!(sparse[&StandardField::InputClosingOverdue], FieldValue::Number(0.0));
    }
}
