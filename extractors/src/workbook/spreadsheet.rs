use super::CellValue;
use calamine::{open_workbook, open_workbook_auto, Reader, Xlsx};
use shared_types::{ReconError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

fn first_sheet_name(names: Vec<String>, path: &Path) -> Result<String> {
    names
        .into_iter()
        .next()
        .ok_or_else(|| ReconError::workbook(path, "workbook has no worksheets"))
}

/// Streams cells in file order and cuts them into rows on row-index change.
pub(super) fn stream_xlsx<S, F>(path: &Path, on_sheet: S, on_row: &mut F) -> Result<String>
where
    S: FnOnce(&str),
    F: FnMut(Vec<CellValue>) -> Result<()>,
{
    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e| ReconError::workbook(path, e))?;
    let sheet_name = first_sheet_name(workbook.sheet_names(), path)?;

    let mut cells = workbook
        .worksheet_cells_reader(&sheet_name)
        .map_err(|e| ReconError::workbook(path, e))?;
    on_sheet(&sheet_name);

    let mut current_row: Option<u32> = None;
    let mut row: Vec<CellValue> = Vec::new();

    while let Some(cell) = cells
        .next_cell()
        .map_err(|e| ReconError::workbook(path, e))?
    {
        let (row_index, column) = cell.get_position();
        if current_row != Some(row_index) {
            if current_row.is_some() {
                on_row(std::mem::take(&mut row))?;
            }
            current_row = Some(row_index);
        }

        let column = column as usize;
        if row.len() <= column {
            row.resize(column + 1, CellValue::Empty);
        }
        row[column] = CellValue::from(cell.get_value());
    }

    if current_row.is_some() {
        on_row(row)?;
    }

    Ok(sheet_name)
}

pub(super) fn stream_workbook<S, F>(path: &Path, on_sheet: S, on_row: &mut F) -> Result<String>
where
    S: FnOnce(&str),
    F: FnMut(Vec<CellValue>) -> Result<()>,
{
    let mut workbook = open_workbook_auto(path).map_err(|e| ReconError::workbook(path, e))?;
    let sheet_name = first_sheet_name(workbook.sheet_names(), path)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ReconError::workbook(path, e))?;
    on_sheet(&sheet_name);

    for row in range.rows() {
        on_row(row.iter().map(CellValue::from).collect())?;
    }

    Ok(sheet_name)
}
