//! Error handling for the Excel MCP server.
//!
//! Every tool reports failures synchronously as a failed call result carrying
//! a stable error kind and a human-readable message. Nothing is retried
//! internally; filesystem errors during load/save propagate as-is.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ExcelError> = std::result::Result<T, E>;

/// Stable error kinds following JSON-RPC 2.0 custom code conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    OutOfWorkspace,
    UnsupportedExtension,
    PathIsDirectory,
    WorkbookNotFound,
    CorruptWorkbook,
    InvalidSheetName,
    SheetNotFound,
    SheetNameCollision,
    LastSheetViolation,
    InvalidIndex,
    InvalidColor,
    InvalidRangeAddress,
    Io,
    SaveFailed,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::OutOfWorkspace => -32001,
            ErrorKind::UnsupportedExtension => -32002,
            ErrorKind::PathIsDirectory => -32003,
            ErrorKind::WorkbookNotFound => -32004,
            ErrorKind::CorruptWorkbook => -32005,
            ErrorKind::InvalidSheetName => -32006,
            ErrorKind::SheetNotFound => -32007,
            ErrorKind::SheetNameCollision => -32008,
            ErrorKind::LastSheetViolation => -32009,
            ErrorKind::InvalidIndex => -32010,
            ErrorKind::InvalidColor => -32011,
            ErrorKind::InvalidRangeAddress => -32012,
            ErrorKind::Io => -32013,
            ErrorKind::SaveFailed => -32014,
            ErrorKind::Internal => -32603,
        }
    }

    /// Error category used in structured log fields.
    pub fn category(&self) -> &'static str {
        match self {
            ErrorKind::OutOfWorkspace
            | ErrorKind::UnsupportedExtension
            | ErrorKind::PathIsDirectory => "sandbox_violation",
            ErrorKind::WorkbookNotFound | ErrorKind::SheetNotFound => "resource_not_found",
            ErrorKind::InvalidSheetName
            | ErrorKind::SheetNameCollision
            | ErrorKind::LastSheetViolation
            | ErrorKind::InvalidIndex
            | ErrorKind::InvalidColor
            | ErrorKind::InvalidRangeAddress => "validation_error",
            ErrorKind::CorruptWorkbook | ErrorKind::Io | ErrorKind::SaveFailed => "io_error",
            ErrorKind::Internal => "server_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

/// Operation error taxonomy shared by all workbook tools.
#[derive(Debug, Error)]
pub enum ExcelError {
    #[error("file_path must be inside workspace {root:?}: {path:?}")]
    OutOfWorkspace { path: PathBuf, root: PathBuf },

    #[error("only .xlsx and .xlsm files are supported: {path:?}")]
    UnsupportedExtension { path: PathBuf },

    #[error("file_path must point to a file, not a directory: {path:?}")]
    PathIsDirectory { path: PathBuf },

    #[error("workbook not found: {path:?}")]
    WorkbookNotFound { path: PathBuf },

    #[error("failed to parse workbook {path:?}: {message}")]
    CorruptWorkbook { path: PathBuf, message: String },

    #[error("sheet_name must be 1-31 characters without []:*?/\\, got {name:?}")]
    InvalidSheetName { name: String },

    #[error("sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("sheet already exists: {name}")]
    SheetNameCollision { name: String },

    #[error("cannot delete the only sheet in workbook")]
    LastSheetViolation,

    #[error("idx and amount must be >= 1 (idx {idx}, amount {amount})")]
    InvalidIndex { idx: i64, amount: i64 },

    #[error("fill_hex must be 6 hex characters, e.g. EAF2FF, got {value:?}")]
    InvalidColor { value: String },

    #[error("invalid cell or range address: {address:?}")]
    InvalidRangeAddress { address: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to save workbook {path:?}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ExcelError {
    pub fn internal(message: impl Into<String>) -> Self {
        ExcelError::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExcelError::OutOfWorkspace { .. } => ErrorKind::OutOfWorkspace,
            ExcelError::UnsupportedExtension { .. } => ErrorKind::UnsupportedExtension,
            ExcelError::PathIsDirectory { .. } => ErrorKind::PathIsDirectory,
            ExcelError::WorkbookNotFound { .. } => ErrorKind::WorkbookNotFound,
            ExcelError::CorruptWorkbook { .. } => ErrorKind::CorruptWorkbook,
            ExcelError::InvalidSheetName { .. } => ErrorKind::InvalidSheetName,
            ExcelError::SheetNotFound { .. } => ErrorKind::SheetNotFound,
            ExcelError::SheetNameCollision { .. } => ErrorKind::SheetNameCollision,
            ExcelError::LastSheetViolation => ErrorKind::LastSheetViolation,
            ExcelError::InvalidIndex { .. } => ErrorKind::InvalidIndex,
            ExcelError::InvalidColor { .. } => ErrorKind::InvalidColor,
            ExcelError::InvalidRangeAddress { .. } => ErrorKind::InvalidRangeAddress,
            ExcelError::Io(_) => ErrorKind::Io,
            ExcelError::SaveFailed { .. } => ErrorKind::SaveFailed,
            ExcelError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Convert into the wire error handed back through rmcp.
    pub fn into_error_data(self) -> rmcp::ErrorData {
        let kind = self.kind();
        let message = self.to_string();
        tracing::debug!(error_kind = %kind, category = kind.category(), "tool call failed");
        let data = serde_json::json!({
            "kind": kind,
            "code": kind.code(),
            "category": kind.category(),
        });

        match kind {
            ErrorKind::InvalidSheetName
            | ErrorKind::InvalidIndex
            | ErrorKind::InvalidColor
            | ErrorKind::InvalidRangeAddress
            | ErrorKind::SheetNameCollision
            | ErrorKind::LastSheetViolation => rmcp::ErrorData::invalid_params(message, Some(data)),
            ErrorKind::OutOfWorkspace
            | ErrorKind::UnsupportedExtension
            | ErrorKind::PathIsDirectory
            | ErrorKind::WorkbookNotFound
            | ErrorKind::SheetNotFound => rmcp::ErrorData::invalid_request(message, Some(data)),
            ErrorKind::CorruptWorkbook
            | ErrorKind::Io
            | ErrorKind::SaveFailed
            | ErrorKind::Internal => rmcp::ErrorData::internal_error(message, Some(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_are_stable() {
        assert_eq!(ErrorKind::OutOfWorkspace.code(), -32001);
        assert_eq!(ErrorKind::InvalidRangeAddress.code(), -32012);
        assert_eq!(ErrorKind::Internal.code(), -32603);
    }

    #[test]
    fn kinds_map_to_categories() {
        assert_eq!(ErrorKind::OutOfWorkspace.category(), "sandbox_violation");
        assert_eq!(ErrorKind::SheetNotFound.category(), "resource_not_found");
        assert_eq!(ErrorKind::InvalidColor.category(), "validation_error");
        assert_eq!(ErrorKind::SaveFailed.category(), "io_error");
    }

    #[test]
    fn error_reports_its_kind() {
        let err = ExcelError::InvalidColor {
            value: "bad".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidColor);
        assert!(err.to_string().contains("6 hex characters"));

        let err = ExcelError::LastSheetViolation;
        assert_eq!(err.kind(), ErrorKind::LastSheetViolation);
    }

    #[test]
    fn validation_errors_surface_as_invalid_params() {
        let data = ExcelError::InvalidIndex { idx: 0, amount: 1 }.into_error_data();
        assert_eq!(data.code, rmcp::model::ErrorCode::INVALID_PARAMS);

        let data = ExcelError::WorkbookNotFound {
            path: PathBuf::from("missing.xlsx"),
        }
        .into_error_data();
        assert_eq!(data.code, rmcp::model::ErrorCode::INVALID_REQUEST);
    }
}
