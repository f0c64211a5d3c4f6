//! Workbook load/save and sheet resolution.
//!
//! Every operation is a fresh load/save cycle: the workbook is read from
//! disk (or created empty), mutated in memory, and persisted before the
//! call returns. Nothing is cached across calls.

use crate::error::{ExcelError, Result};
use std::fs;
use std::path::Path;
use umya_spreadsheet::{Spreadsheet, Worksheet};

pub const SHEET_NAME_MAX_LEN: usize = 31;
const SHEET_NAME_FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Open an existing workbook, or create a new one with a single default
/// sheet when `create_if_missing` is set. A created workbook is persisted
/// immediately so the file exists even if the operation later fails.
pub fn open_or_create(path: &Path, create_if_missing: bool) -> Result<Spreadsheet> {
    if path.exists() {
        return umya_spreadsheet::reader::xlsx::read(path).map_err(|err| {
            ExcelError::CorruptWorkbook {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        });
    }
    if !create_if_missing {
        return Err(ExcelError::WorkbookNotFound {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let book = umya_spreadsheet::new_file();
    save(&book, path)?;
    Ok(book)
}

/// Persist the workbook with an atomic replace: write to a temp file in the
/// target directory, then rename over the destination. A crash mid-save
/// leaves the previous file intact.
pub fn save(book: &Spreadsheet, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".excel-mcp-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    umya_spreadsheet::writer::xlsx::write(book, tmp.path()).map_err(|err| {
        ExcelError::SaveFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    })?;

    tmp.persist(path).map_err(|err| ExcelError::SaveFailed {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(())
}

/// Sheet names must be 1-31 characters and exclude `[ ] : * ? / \`.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let length = name.chars().count();
    if length == 0 || length > SHEET_NAME_MAX_LEN || name.contains(SHEET_NAME_FORBIDDEN) {
        return Err(ExcelError::InvalidSheetName {
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn sheet_names(book: &Spreadsheet) -> Vec<String> {
    book.get_sheet_collection()
        .iter()
        .map(|sheet| sheet.get_name().to_string())
        .collect()
}

pub fn has_sheet(book: &Spreadsheet, name: &str) -> bool {
    book.get_sheet_by_name(name).is_some()
}

/// Fetch a sheet by exact name, appending a new empty sheet when absent and
/// `create_if_missing` is set. Existing sheet order is preserved.
pub fn ensure_sheet<'a>(
    book: &'a mut Spreadsheet,
    name: &str,
    create_if_missing: bool,
) -> Result<&'a mut Worksheet> {
    validate_sheet_name(name)?;
    if !has_sheet(book, name) {
        if !create_if_missing {
            return Err(ExcelError::SheetNotFound {
                name: name.to_string(),
            });
        }
        book.new_sheet(name)
            .map_err(|err| ExcelError::internal(format!("failed to create sheet {name:?}: {err}")))?;
    }
    book.get_sheet_by_name_mut(name)
        .ok_or_else(|| ExcelError::SheetNotFound {
            name: name.to_string(),
        })
}

/// Rename a sheet in place, preserving position and content.
pub fn rename_sheet(book: &mut Spreadsheet, old_name: &str, new_name: &str) -> Result<()> {
    validate_sheet_name(new_name)?;
    let index = book
        .get_sheet_collection_no_check()
        .iter()
        .position(|sheet| sheet.get_name() == old_name)
        .ok_or_else(|| ExcelError::SheetNotFound {
            name: old_name.to_string(),
        })?;
    if has_sheet(book, new_name) {
        return Err(ExcelError::SheetNameCollision {
            name: new_name.to_string(),
        });
    }
    book.set_sheet_name(index, new_name)
        .map_err(|err| ExcelError::internal(format!("failed to rename sheet {old_name:?}: {err}")))
}

/// Remove a sheet. A workbook must always retain at least one sheet, so a
/// single-sheet workbook rejects the delete before anything else.
pub fn delete_sheet(book: &mut Spreadsheet, name: &str) -> Result<()> {
    if book.get_sheet_collection_no_check().len() <= 1 {
        return Err(ExcelError::LastSheetViolation);
    }
    if !has_sheet(book, name) {
        return Err(ExcelError::SheetNotFound {
            name: name.to_string(),
        });
    }
    book.remove_sheet_by_name(name)
        .map_err(|err| ExcelError::internal(format!("failed to delete sheet {name:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_name_validation() {
        assert!(validate_sheet_name("Data").is_ok());
        assert!(validate_sheet_name(&"x".repeat(31)).is_ok());

        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
        for bad in ["a[b", "a]b", "a:b", "a*b", "a?b", "a/b", "a\\b"] {
            assert!(validate_sheet_name(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn ensure_sheet_appends_preserving_order() {
        let mut book = umya_spreadsheet::new_file();
        ensure_sheet(&mut book, "Data", true).expect("create");
        ensure_sheet(&mut book, "Extra", true).expect("create");
        assert_eq!(sheet_names(&book), vec!["Sheet1", "Data", "Extra"]);

        let err = ensure_sheet(&mut book, "Missing", false).expect_err("missing");
        assert!(matches!(err, ExcelError::SheetNotFound { .. }));
    }

    #[test]
    fn rename_rejects_collisions_and_keeps_position() {
        let mut book = umya_spreadsheet::new_file();
        ensure_sheet(&mut book, "Data", true).expect("create");

        let err = rename_sheet(&mut book, "Sheet1", "Data").expect_err("collision");
        assert!(matches!(err, ExcelError::SheetNameCollision { .. }));
        assert_eq!(sheet_names(&book), vec!["Sheet1", "Data"]);

        rename_sheet(&mut book, "Sheet1", "Report").expect("rename");
        assert_eq!(sheet_names(&book), vec!["Report", "Data"]);

        let err = rename_sheet(&mut book, "Gone", "Other").expect_err("missing");
        assert!(matches!(err, ExcelError::SheetNotFound { .. }));
    }

    #[test]
    fn delete_always_leaves_one_sheet() {
        let mut book = umya_spreadsheet::new_file();
        let err = delete_sheet(&mut book, "Sheet1").expect_err("last sheet");
        assert!(matches!(err, ExcelError::LastSheetViolation));

        // even for a name that does not exist
        let err = delete_sheet(&mut book, "Nope").expect_err("last sheet");
        assert!(matches!(err, ExcelError::LastSheetViolation));

        ensure_sheet(&mut book, "Data", true).expect("create");
        delete_sheet(&mut book, "Sheet1").expect("delete");
        assert_eq!(sheet_names(&book), vec!["Data"]);
    }
}
