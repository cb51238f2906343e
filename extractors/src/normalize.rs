//! Value normalization shared by every sheet reader.
//!
//! These functions never fail: anything unparseable resolves to a default (0, `""` or
//! `"0%"`).

use crate::workbook::CellValue;
use chrono::{Duration, NaiveDate};
use shared_types::{number_from_text, CollectionMonth, FieldValue, LoanId};

/// Day zero of the spreadsheet serial date system.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Numeric view of a cell; empty, unparseable or non-finite input is 0.
pub fn to_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Empty => 0.0,
        CellValue::Number(number) if number.is_finite() => *number,
        CellValue::Number(_) => 0.0,
        CellValue::Text(text) => number_from_text(text),
        CellValue::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Stringified and trimmed loan identifier, or `None` when blank.
pub fn normalize_identifier(value: &CellValue) -> Option<LoanId> {
    LoanId::new(&value.to_string())
}

fn serial_value(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(number) => Some(*number),
        CellValue::Text(text) => text.trim().parse::<f64>().ok(),
        CellValue::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
    }
}

/// Converts a spreadsheet serial date into `DD-MM-YYYY`, truncating any time of day.
///
/// Serials below 1, serials past the last representable date and non-numeric input give `""`.
pub fn date_serial_to_dmy(value: &CellValue) -> String {
    let serial = match serial_value(value) {
        Some(serial) if serial.is_finite() && serial >= 1.0 => serial,
        _ => return String::new(),
    };

    let (year, month, day) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day)
        .zip(Duration::try_days(serial.floor() as i64))
        .and_then(|(epoch, offset)| epoch.checked_add_signed(offset))
        .map(|date| date.format("%d-%m-%Y").to_string())
        .unwrap_or_default()
}

/// Renders a rate as `"<n>%"`; blank or unparseable input gives `"0%"`.
pub fn number_to_percent_label(value: &CellValue) -> String {
    if value.is_empty() {
        return "0%".to_string();
    }
    format!("{}%", FieldValue::Number(to_number(value)))
}

/// `"Mar-24"` for March 2024.
pub fn format_month_label(month: CollectionMonth) -> String {
    month.first_day().format("%b-%y").to_string()
}

/// Lowercase month name and four digit year used to locate month-specific columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthYear {
    pub month_name: String,
    pub year: String,
}

impl MonthYear {
    pub fn new(month: CollectionMonth) -> Self {
        Self {
            month_name: month.first_day().format("%B").to_string().to_lowercase(),
            year: format!("{:04}", month.year()),
        }
    }

    /// Three letter abbreviation, `"mar"` for `"march"`.
    pub fn abbreviation(&self) -> &str {
        let end = self
            .month_name
            .char_indices()
            .nth(3)
            .map(|(index, _)| index)
            .unwrap_or(self.month_name.len());
        &self.month_name[..end]
    }
}

/// Payout date of the period following `month`, as `DD-MM-YYYY`.
///
/// Day counting starts at the first of the next month, so out-of-range days roll forward
/// into later months and day 0 lands on the last day of `month`.
pub fn next_period_date(month: CollectionMonth, payout_day: u32) -> String {
    let first_of_next = month.next().first_day();
    let offset = Duration::days(i64::from(payout_day) - 1);
    first_of_next
        .checked_add_signed(offset)
        .map(|date| date.format("%d-%m-%Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    fn march_2024() -> CollectionMonth {
        CollectionMonth::parse("2024-03").unwrap()
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&CellValue::Number(12.5)), 12.5);
        assert_eq!(to_number(&text(" 1500 ")), 1500.0);
        assert_eq!(to_number(&text("1,500")), 0.0);
        assert_eq!(to_number(&text("abc")), 0.0);
        assert_eq!(to_number(&CellValue::Empty), 0.0);
        assert_eq!(to_number(&CellValue::Number(f64::NAN)), 0.0);
        assert_eq!(to_number(&CellValue::Number(f64::INFINITY)), 0.0);
        assert_eq!(to_number(&CellValue::Bool(true)), 1.0);
    }

    #[test]
    fn test_to_number_never_produces_nan() {
        for cell in [
            CellValue::Empty,
            text("NaN"),
            text("inf"),
            text("-"),
            CellValue::Number(f64::NEG_INFINITY),
        ] {
            assert!(to_number(&cell).is_finite(), "{:?}", cell);
        }
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(
            normalize_identifier(&text("  LAN001 ")).unwrap().as_str(),
            "LAN001"
        );
        assert_eq!(
            normalize_identifier(&CellValue::Number(12345.0)).unwrap().as_str(),
            "12345"
        );
        assert!(normalize_identifier(&text("   ")).is_none());
        assert!(normalize_identifier(&CellValue::Empty).is_none());
    }

    #[test]
    fn test_date_serial_to_dmy() {
        assert_eq!(date_serial_to_dmy(&CellValue::Number(45000.0)), "15-03-2023");
        assert_eq!(date_serial_to_dmy(&CellValue::Number(45000.75)), "15-03-2023");
        assert_eq!(date_serial_to_dmy(&text("45000")), "15-03-2023");
        assert_eq!(date_serial_to_dmy(&CellValue::Number(1.0)), "31-12-1899");
        assert_eq!(date_serial_to_dmy(&CellValue::Number(0.0)), "");
        assert_eq!(date_serial_to_dmy(&CellValue::Number(-3.0)), "");
        assert_eq!(date_serial_to_dmy(&text("15/03/2023")), "");
        assert_eq!(date_serial_to_dmy(&CellValue::Empty), "");
    }

    #[test]
    fn test_date_serial_out_of_range() {
        assert_eq!(date_serial_to_dmy(&CellValue::Number(1e15)), "");
        assert_eq!(date_serial_to_dmy(&CellValue::Number(f64::MAX)), "");
        assert_eq!(date_serial_to_dmy(&text("1e15")), "");
        assert_eq!(date_serial_to_dmy(&text("99999999999999999999")), "");
        // past NaiveDate::MAX but within the day-offset range
        assert_eq!(date_serial_to_dmy(&CellValue::Number(1e11)), "");
    }

    #[test]
    fn test_date_serial_output_shape() {
        for serial in [1.0, 60.0, 25569.0, 44927.0, 45351.0, 47000.5] {
            let formatted = date_serial_to_dmy(&CellValue::Number(serial));
            let parts: Vec<&str> = formatted.split('-').collect();
            assert_eq!(parts.len(), 3, "{}", formatted);
            assert_eq!(parts[0].len(), 2);
            assert_eq!(parts[1].len(), 2);
            assert_eq!(parts[2].len(), 4);
        }
    }

    #[test]
    fn test_number_to_percent_label() {
        assert_eq!(number_to_percent_label(&CellValue::Number(12.5)), "12.5%");
        assert_eq!(number_to_percent_label(&text("9")), "9%");
        assert_eq!(number_to_percent_label(&CellValue::Empty), "0%");
        assert_eq!(number_to_percent_label(&text("n/a")), "0%");
    }

    #[test]
    fn test_month_labels() {
        let month = march_2024();
        assert_eq!(format_month_label(month), "Mar-24");

        let parts = MonthYear::new(month);
        assert_eq!(parts.month_name, "march");
        assert_eq!(parts.year, "2024");
        assert_eq!(parts.abbreviation(), "mar");
        assert_eq!(MonthYear::new(CollectionMonth::parse("2023-05").unwrap()).abbreviation(), "may");
    }

    #[test]
    fn test_next_period_date() {
        assert_eq!(next_period_date(march_2024(), 5), "05-04-2024");
        assert_eq!(next_period_date(march_2024(), 1), "01-04-2024");
        assert_eq!(
            next_period_date(CollectionMonth::parse("2024-12").unwrap(), 10),
            "10-01-2025"
        );
    }

    #[test]
    fn test_next_period_date_overflow_days() {
        // April has 30 days
        assert_eq!(next_period_date(march_2024(), 31), "01-05-2024");
        assert_eq!(next_period_date(march_2024(), 0), "31-03-2024");
        assert_eq!(
            next_period_date(CollectionMonth::parse("2024-01").unwrap(), 30),
            "01-03-2024"
        );
    }
}
