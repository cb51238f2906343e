use super::CellValue;
use shared_types::{ReconError, Result};
use std::path::Path;

pub(super) fn stream_delimited<S, F>(path: &Path, on_sheet: S, on_row: &mut F) -> Result<String>
where
    S: FnOnce(&str),
    F: FnMut(Vec<CellValue>) -> Result<()>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ReconError::workbook(path, e))?;

    let sheet_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Sheet1")
        .to_string();
    on_sheet(&sheet_name);

    for record in reader.records() {
        let record = record.map_err(|e| ReconError::Csv(e.to_string()))?;
        on_row(record.iter().map(CellValue::from_text).collect())?;
    }

    Ok(sheet_name)
}
