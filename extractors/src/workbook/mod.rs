//! Row-at-a-time reading of the first worksheet of an input file.
//!
//! `.xlsx`/`.xlsm` files are streamed cell by cell so large dumps never sit in memory as a
//! whole sheet. Legacy workbooks (`.xls`, `.xlsb`, `.ods`) go through calamine's range API
//! and `.csv`/`.txt` files through the csv reader.

mod cell;
mod delimited;
mod spreadsheet;

pub use cell::CellValue;
pub(crate) use cell::EMPTY_CELL;

use shared_types::Result;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    StreamedXlsx,
    Workbook,
    Delimited,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => SourceFormat::StreamedXlsx,
            Some("csv") | Some("txt") => SourceFormat::Delimited,
            _ => SourceFormat::Workbook,
        }
    }
}

/// Feeds every non-blank row of the first worksheet to `on_row`, in sheet order.
///
/// Returns the worksheet name (the file stem for delimited files). The first error returned by
/// `on_row` stops the stream and is passed through.
pub fn stream_first_sheet<F>(path: &Path, on_row: F) -> Result<String>
where
    F: FnMut(Vec<CellValue>) -> Result<()>,
{
    stream_first_sheet_with(path, |_| {}, on_row)
}

/// Like [`stream_first_sheet`], but hands the worksheet name to `on_sheet` once the file is
/// open and before the first row is read.
pub fn stream_first_sheet_with<S, F>(path: &Path, on_sheet: S, mut on_row: F) -> Result<String>
where
    S: FnOnce(&str),
    F: FnMut(Vec<CellValue>) -> Result<()>,
{
    let mut skip_blank = |row: Vec<CellValue>| {
        if row.iter().any(|cell| !cell.is_empty()) {
            on_row(row)
        } else {
            Ok(())
        }
    };

    match SourceFormat::detect(path) {
        SourceFormat::StreamedXlsx => spreadsheet::stream_xlsx(path, on_sheet, &mut skip_blank),
        SourceFormat::Workbook => spreadsheet::stream_workbook(path, on_sheet, &mut skip_blank),
        SourceFormat::Delimited => delimited::stream_delimited(path, on_sheet, &mut skip_blank),
    }
}
