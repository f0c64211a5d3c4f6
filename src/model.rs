use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An opaque scalar cell value. No formula evaluation, no coercion: the
/// typed variant a caller sends is the variant written to the workbook.
///
/// Serialized untagged, so JSON scalars map directly: `true`, `42.5`,
/// `"text"`. Empty cells are represented as `None` at the containing
/// `Option` layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Decode a stored cell into a wire value, `None` for empty.
///
/// umya keeps every value as a string internally; numbers and booleans are
/// recovered from the raw form.
pub fn cell_to_value(cell: &umya_spreadsheet::Cell) -> Option<CellValue> {
    let raw = cell.get_value();
    if raw.is_empty() {
        return None;
    }
    if let Ok(number) = raw.parse::<f64>() {
        return Some(CellValue::Number(number));
    }

    let lower = raw.to_ascii_lowercase();
    if lower == "true" {
        return Some(CellValue::Bool(true));
    }
    if lower == "false" {
        return Some(CellValue::Bool(false));
    }

    Some(CellValue::Text(raw.to_string()))
}

/// Write a typed value into a cell, preserving the caller's typing.
pub fn write_value(cell: &mut umya_spreadsheet::Cell, value: &CellValue) {
    match value {
        CellValue::Text(text) => {
            cell.set_value_string(text.clone());
        }
        CellValue::Number(number) => {
            cell.set_value_number(*number);
        }
        CellValue::Bool(flag) => {
            cell.set_value_bool(*flag);
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SheetListResponse {
    pub file_path: String,
    pub sheets: Vec<String>,
    pub workspace_root: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReadRangeResponse {
    pub file_path: String,
    pub sheet_name: String,
    pub cell_range: String,
    pub values: Vec<Vec<Option<CellValue>>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WriteCellResponse {
    pub file_path: String,
    pub sheet_name: String,
    pub cell: String,
    pub value: CellValue,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WriteRangeResponse {
    pub file_path: String,
    pub sheet_name: String,
    pub start_cell: String,
    pub rows: usize,
    pub written_cells: u64,
    pub saved: bool,
}

/// Shared response for the four row/column structural edits.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct StructuralEditResponse {
    pub file_path: String,
    pub sheet_name: String,
    pub idx: u32,
    pub amount: u32,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct RenameSheetResponse {
    pub file_path: String,
    pub old_name: String,
    pub new_name: String,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DeleteSheetResponse {
    pub file_path: String,
    pub deleted_sheet: String,
    pub remaining_sheets: Vec<String>,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ClearRangeResponse {
    pub file_path: String,
    pub sheet_name: String,
    pub cell_range: String,
    pub cleared_cells: u64,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FormatRangeResponse {
    pub file_path: String,
    pub sheet_name: String,
    pub cell_range: String,
    pub updated_cells: u64,
    pub saved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_value_deserializes_untagged() {
        let value: CellValue = serde_json::from_str("true").expect("bool");
        assert_eq!(value, CellValue::Bool(true));

        let value: CellValue = serde_json::from_str("123.5").expect("number");
        assert_eq!(value, CellValue::Number(123.5));

        let value: CellValue = serde_json::from_str("\"gpu\"").expect("text");
        assert_eq!(value, CellValue::Text("gpu".to_string()));
    }

    #[test]
    fn cell_value_serializes_to_bare_scalars() {
        assert_eq!(
            serde_json::to_string(&CellValue::Number(456.0)).expect("json"),
            "456.0"
        );
        assert_eq!(
            serde_json::to_string(&CellValue::Text("x".to_string())).expect("json"),
            "\"x\""
        );
    }
}
