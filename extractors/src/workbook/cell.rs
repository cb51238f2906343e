use calamine::{Data, DataRef};
use shared_types::FieldValue;
use std::fmt;

/// A raw cell as read from any supported input format.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

pub(crate) static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Cells from delimited files are always text; an empty field is an empty cell.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Header label: stringified and trimmed.
    pub fn label(&self) -> String {
        self.to_string().trim().to_string()
    }

    /// The value a mapped column contributes to a record, or `None` when the cell is empty.
    ///
    /// Falsy values (NaN, `false`) contribute 0.
    pub fn to_field_value(&self) -> Option<FieldValue> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(text) if text.is_empty() => None,
            CellValue::Text(text) => Some(FieldValue::Text(text.clone())),
            CellValue::Number(value) if value.is_nan() => Some(FieldValue::zero()),
            CellValue::Number(value) => Some(FieldValue::Number(*value)),
            CellValue::Bool(false) => Some(FieldValue::zero()),
            CellValue::Bool(true) => Some(FieldValue::text("true")),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

// Date cells are kept as their serial number; the date rules convert them.
impl From<&Data> for CellValue {
    fn from(value: &Data) -> Self {
        match value {
            Data::Int(v) => CellValue::Number(*v as f64),
            Data::Float(v) => CellValue::Number(*v),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Text(e.to_string()),
            Data::Empty => CellValue::Empty,
        }
    }
}

impl From<&DataRef<'_>> for CellValue {
    fn from(value: &DataRef<'_>) -> Self {
        match value {
            DataRef::Int(v) => CellValue::Number(*v as f64),
            DataRef::Float(v) => CellValue::Number(*v),
            DataRef::String(s) => CellValue::Text(s.clone()),
            DataRef::SharedString(s) => CellValue::Text(s.to_string()),
            DataRef::Bool(b) => CellValue::Bool(*b),
            DataRef::DateTime(dt) => CellValue::Number(dt.as_f64()),
            DataRef::DateTimeIso(s) | DataRef::DurationIso(s) => CellValue::Text(s.clone()),
            DataRef::Error(e) => CellValue::Text(e.to_string()),
            DataRef::Empty => CellValue::Empty,
        }
    }
}
