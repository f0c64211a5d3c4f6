//! Tool implementations.
//!
//! Each operation composes the same pipeline: sandbox the path, load (or
//! create) the workbook, resolve the sheet, apply one effect, persist if it
//! mutated anything, and shape the response. No state survives between
//! calls.

use crate::error::{ExcelError, Result};
use crate::model::*;
use crate::range::{self, RangeBounds};
use crate::sandbox;
use crate::state::AppState;
use crate::styles::StylePatch;
use crate::workbook;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

fn default_true() -> bool {
    true
}

fn default_amount() -> i64 {
    1
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListSheetsParams {
    pub file_path: String,
    #[serde(default)]
    pub create_if_missing: bool,
}

pub async fn list_sheets(
    state: Arc<AppState>,
    params: ListSheetsParams,
) -> Result<SheetListResponse> {
    let root = sandbox::workspace_root(state.config())?;
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let book = workbook::open_or_create(&path, params.create_if_missing)?;
    Ok(SheetListResponse {
        file_path: sandbox::display_path(&path),
        sheets: workbook::sheet_names(&book),
        workspace_root: sandbox::display_path(&root),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadRangeParams {
    pub file_path: String,
    pub sheet_name: String,
    pub cell_range: String,
    #[serde(default)]
    pub create_if_missing: bool,
}

pub async fn read_range(
    state: Arc<AppState>,
    params: ReadRangeParams,
) -> Result<ReadRangeResponse> {
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let mut book = workbook::open_or_create(&path, params.create_if_missing)?;
    let bounds = range::parse_range(&params.cell_range)?;

    let sheet = workbook::ensure_sheet(&mut book, &params.sheet_name, params.create_if_missing)?;
    let mut values = Vec::with_capacity((bounds.max_row - bounds.min_row + 1) as usize);
    for row in bounds.min_row..=bounds.max_row {
        let mut out_row = Vec::with_capacity((bounds.max_col - bounds.min_col + 1) as usize);
        for col in bounds.min_col..=bounds.max_col {
            out_row.push(sheet.get_cell((col, row)).and_then(cell_to_value));
        }
        values.push(out_row);
    }

    Ok(ReadRangeResponse {
        file_path: sandbox::display_path(&path),
        sheet_name: params.sheet_name,
        cell_range: params.cell_range,
        values,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteCellParams {
    pub file_path: String,
    pub sheet_name: String,
    pub cell: String,
    pub value: CellValue,
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

pub async fn write_cell(
    state: Arc<AppState>,
    params: WriteCellParams,
) -> Result<WriteCellResponse> {
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let lock = state.write_lock(&path);
    let _guard = lock.lock().await;

    let mut book = workbook::open_or_create(&path, params.create_if_missing)?;
    let (col, row) = range::parse_cell(&params.cell)?;
    {
        let sheet =
            workbook::ensure_sheet(&mut book, &params.sheet_name, params.create_if_missing)?;
        write_value(sheet.get_cell_mut((col, row)), &params.value);
    }
    workbook::save(&book, &path)?;

    Ok(WriteCellResponse {
        file_path: sandbox::display_path(&path),
        sheet_name: params.sheet_name,
        cell: params.cell,
        value: params.value,
        saved: true,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteRangeParams {
    pub file_path: String,
    pub sheet_name: String,
    pub start_cell: String,
    /// Row-major values written starting at `start_cell`. Explicit nulls
    /// blank the target cell and still count as written.
    pub values: Vec<Vec<Option<CellValue>>>,
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
}

pub async fn write_range(
    state: Arc<AppState>,
    params: WriteRangeParams,
) -> Result<WriteRangeResponse> {
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let lock = state.write_lock(&path);
    let _guard = lock.lock().await;

    let mut book = workbook::open_or_create(&path, params.create_if_missing)?;
    let (start_col, start_row) = range::parse_cell(&params.start_cell)?;

    let mut written_cells: u64 = 0;
    {
        let sheet =
            workbook::ensure_sheet(&mut book, &params.sheet_name, params.create_if_missing)?;
        for (row_offset, row_values) in params.values.iter().enumerate() {
            for (col_offset, value) in row_values.iter().enumerate() {
                let coordinate = (
                    start_col + col_offset as u32,
                    start_row + row_offset as u32,
                );
                let cell = sheet.get_cell_mut(coordinate);
                match value {
                    Some(value) => write_value(cell, value),
                    None => {
                        cell.set_value(String::new());
                    }
                }
                written_cells += 1;
            }
        }
    }
    workbook::save(&book, &path)?;

    Ok(WriteRangeResponse {
        file_path: sandbox::display_path(&path),
        sheet_name: params.sheet_name,
        start_cell: params.start_cell,
        rows: params.values.len(),
        written_cells,
        saved: true,
    })
}

/// Parameters shared by the four row/column structural edits.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct StructuralEditParams {
    pub file_path: String,
    pub sheet_name: String,
    /// 1-based row or column index the edit starts at.
    pub idx: i64,
    #[serde(default = "default_amount")]
    pub amount: i64,
    #[serde(default)]
    pub create_if_missing: bool,
}

#[derive(Debug, Clone, Copy)]
enum StructuralEdit {
    InsertRows,
    DeleteRows,
    InsertColumns,
    DeleteColumns,
}

async fn structural_edit(
    state: Arc<AppState>,
    params: StructuralEditParams,
    edit: StructuralEdit,
) -> Result<StructuralEditResponse> {
    let (idx, amount) = validate_index(params.idx, params.amount)?;
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let lock = state.write_lock(&path);
    let _guard = lock.lock().await;

    let mut book = workbook::open_or_create(&path, params.create_if_missing)?;
    {
        let sheet =
            workbook::ensure_sheet(&mut book, &params.sheet_name, params.create_if_missing)?;
        match edit {
            StructuralEdit::InsertRows => {
                sheet.insert_new_row(&idx, &amount);
            }
            StructuralEdit::DeleteRows => {
                sheet.remove_row(&idx, &amount);
            }
            StructuralEdit::InsertColumns => {
                sheet.insert_new_column(&range::column_letters(idx), &amount);
            }
            StructuralEdit::DeleteColumns => {
                sheet.remove_column(&range::column_letters(idx), &amount);
            }
        }
    }
    workbook::save(&book, &path)?;

    Ok(StructuralEditResponse {
        file_path: sandbox::display_path(&path),
        sheet_name: params.sheet_name,
        idx,
        amount,
        saved: true,
    })
}

pub async fn insert_rows(
    state: Arc<AppState>,
    params: StructuralEditParams,
) -> Result<StructuralEditResponse> {
    structural_edit(state, params, StructuralEdit::InsertRows).await
}

pub async fn delete_rows(
    state: Arc<AppState>,
    params: StructuralEditParams,
) -> Result<StructuralEditResponse> {
    structural_edit(state, params, StructuralEdit::DeleteRows).await
}

pub async fn insert_columns(
    state: Arc<AppState>,
    params: StructuralEditParams,
) -> Result<StructuralEditResponse> {
    structural_edit(state, params, StructuralEdit::InsertColumns).await
}

pub async fn delete_columns(
    state: Arc<AppState>,
    params: StructuralEditParams,
) -> Result<StructuralEditResponse> {
    structural_edit(state, params, StructuralEdit::DeleteColumns).await
}

fn validate_index(idx: i64, amount: i64) -> Result<(u32, u32)> {
    let invalid = || ExcelError::InvalidIndex { idx, amount };
    if idx < 1 || amount < 1 {
        return Err(invalid());
    }
    let idx = u32::try_from(idx).map_err(|_| invalid())?;
    let amount = u32::try_from(amount).map_err(|_| invalid())?;
    Ok((idx, amount))
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenameSheetParams {
    pub file_path: String,
    pub old_name: String,
    pub new_name: String,
}

pub async fn rename_sheet(
    state: Arc<AppState>,
    params: RenameSheetParams,
) -> Result<RenameSheetResponse> {
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let lock = state.write_lock(&path);
    let _guard = lock.lock().await;

    let mut book = workbook::open_or_create(&path, false)?;
    workbook::rename_sheet(&mut book, &params.old_name, &params.new_name)?;
    workbook::save(&book, &path)?;

    Ok(RenameSheetResponse {
        file_path: sandbox::display_path(&path),
        old_name: params.old_name,
        new_name: params.new_name,
        saved: true,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteSheetParams {
    pub file_path: String,
    pub sheet_name: String,
}

pub async fn delete_sheet(
    state: Arc<AppState>,
    params: DeleteSheetParams,
) -> Result<DeleteSheetResponse> {
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let lock = state.write_lock(&path);
    let _guard = lock.lock().await;

    let mut book = workbook::open_or_create(&path, false)?;
    workbook::delete_sheet(&mut book, &params.sheet_name)?;
    workbook::save(&book, &path)?;

    Ok(DeleteSheetResponse {
        file_path: sandbox::display_path(&path),
        deleted_sheet: params.sheet_name,
        remaining_sheets: workbook::sheet_names(&book),
        saved: true,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClearRangeParams {
    pub file_path: String,
    pub sheet_name: String,
    pub cell_range: String,
    #[serde(default)]
    pub create_if_missing: bool,
}

pub async fn clear_range(
    state: Arc<AppState>,
    params: ClearRangeParams,
) -> Result<ClearRangeResponse> {
    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let lock = state.write_lock(&path);
    let _guard = lock.lock().await;

    let mut book = workbook::open_or_create(&path, params.create_if_missing)?;
    let bounds = range::parse_range(&params.cell_range)?;

    let mut cleared_cells: u64 = 0;
    {
        let sheet =
            workbook::ensure_sheet(&mut book, &params.sheet_name, params.create_if_missing)?;
        for row in bounds.min_row..=bounds.max_row {
            for col in bounds.min_col..=bounds.max_col {
                // only touch materialized cells; formatting stays intact
                if sheet.get_cell((col, row)).is_none() {
                    continue;
                }
                let cell = sheet.get_cell_mut((col, row));
                if !cell.get_value().is_empty() {
                    cleared_cells += 1;
                }
                cell.set_value(String::new());
            }
        }
    }
    workbook::save(&book, &path)?;

    Ok(ClearRangeResponse {
        file_path: sandbox::display_path(&path),
        sheet_name: params.sheet_name,
        cell_range: params.cell_range,
        cleared_cells,
        saved: true,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatRangeParams {
    pub file_path: String,
    pub sheet_name: String,
    pub cell_range: String,
    #[serde(default)]
    pub bold: Option<bool>,
    #[serde(default)]
    pub wrap_text: Option<bool>,
    #[serde(default)]
    pub horizontal: Option<String>,
    #[serde(default)]
    pub vertical: Option<String>,
    #[serde(default)]
    pub number_format: Option<String>,
    /// Solid fill color as 6 hex digits, optionally prefixed with `#`.
    #[serde(default)]
    pub fill_hex: Option<String>,
    #[serde(default)]
    pub create_if_missing: bool,
}

pub async fn format_range(
    state: Arc<AppState>,
    params: FormatRangeParams,
) -> Result<FormatRangeResponse> {
    let patch = StylePatch {
        bold: params.bold,
        wrap_text: params.wrap_text,
        horizontal: params.horizontal.clone(),
        vertical: params.vertical.clone(),
        number_format: params.number_format.clone(),
        fill_hex: params.fill_hex.clone(),
    }
    .normalized()?;

    let path = sandbox::resolve(state.config(), &params.file_path)?;
    let lock = state.write_lock(&path);
    let _guard = lock.lock().await;

    let mut book = workbook::open_or_create(&path, params.create_if_missing)?;
    let bounds = range::parse_range(&params.cell_range)?;

    let updated_cells = bounds.cell_count();
    {
        let sheet =
            workbook::ensure_sheet(&mut book, &params.sheet_name, params.create_if_missing)?;
        apply_patch_to_bounds(sheet, &bounds, &patch);
    }
    workbook::save(&book, &path)?;

    Ok(FormatRangeResponse {
        file_path: sandbox::display_path(&path),
        sheet_name: params.sheet_name,
        cell_range: params.cell_range,
        updated_cells,
        saved: true,
    })
}

fn apply_patch_to_bounds(
    sheet: &mut umya_spreadsheet::Worksheet,
    bounds: &RangeBounds,
    patch: &StylePatch,
) {
    for row in bounds.min_row..=bounds.max_row {
        for col in bounds.min_col..=bounds.max_col {
            patch.apply(sheet.get_cell_mut((col, row)).get_style_mut());
        }
    }
}
