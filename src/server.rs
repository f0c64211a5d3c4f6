use crate::config::ServerConfig;
use crate::error::ExcelError;
use crate::model::{
    ClearRangeResponse, DeleteSheetResponse, FormatRangeResponse, ReadRangeResponse,
    RenameSheetResponse, SheetListResponse, StructuralEditResponse, WriteCellResponse,
    WriteRangeResponse,
};
use crate::state::AppState;
use crate::tools;
use anyhow::Result;
use rmcp::{
    ErrorData as McpError, Json, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use std::sync::Arc;

const INSTRUCTIONS: &str = "\
Excel MCP: read and edit .xlsx/.xlsm workbooks inside the configured workspace.

WORKFLOW:
1) list_sheets to orient; read_range (A1 notation, e.g. A1:C10) to inspect values.
2) write_cell / write_range for values; typed scalars (text, number, boolean) are \
preserved as given.
3) insert_rows / delete_rows / insert_columns / delete_columns for structural \
edits (1-based idx, amount >= 1).
4) rename_sheet / delete_sheet for sheet management. A workbook always keeps \
at least one sheet.
5) clear_range blanks values but keeps formatting; format_range applies partial \
formatting (bold, wrap_text, horizontal, vertical, number_format, fill_hex) as a \
merge over existing styles.

PATHS: file_path must stay inside the workspace root. Relative paths resolve \
against it. Only .xlsx and .xlsm are accepted.

Set create_if_missing=true to create missing workbooks/sheets on write-style \
tools. Every call loads the file fresh and saves it back before returning.";

#[derive(Clone)]
pub struct ExcelServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<ExcelServer>,
}

impl ExcelServer {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self::from_state(Arc::new(AppState::new(config)))
    }

    pub fn from_state(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
        service.waiting().await?;
        Ok(())
    }

    fn ensure_tool_enabled(&self, tool: &str) -> Result<(), McpError> {
        tracing::info!(tool = tool, "tool invocation requested");
        if self.state.config().is_tool_enabled(tool) {
            Ok(())
        } else {
            Err(McpError::invalid_request(
                format!("tool '{tool}' is disabled by server configuration"),
                None,
            ))
        }
    }
}

#[tool_router]
impl ExcelServer {
    #[tool(
        name = "list_sheets",
        description = "List all sheet names in an Excel workbook"
    )]
    pub async fn list_sheets(
        &self,
        Parameters(params): Parameters<tools::ListSheetsParams>,
    ) -> Result<Json<SheetListResponse>, McpError> {
        self.ensure_tool_enabled("list_sheets")?;
        tools::list_sheets(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "read_range",
        description = "Read a range like A1:C10 and return values as a 2D array"
    )]
    pub async fn read_range(
        &self,
        Parameters(params): Parameters<tools::ReadRangeParams>,
    ) -> Result<Json<ReadRangeResponse>, McpError> {
        self.ensure_tool_enabled("read_range")?;
        tools::read_range(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "write_cell",
        description = "Write one value into a single cell (for example B2)"
    )]
    pub async fn write_cell(
        &self,
        Parameters(params): Parameters<tools::WriteCellParams>,
    ) -> Result<Json<WriteCellResponse>, McpError> {
        self.ensure_tool_enabled("write_cell")?;
        tools::write_cell(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "write_range",
        description = "Write a 2D array of values starting at start_cell (for example A1)"
    )]
    pub async fn write_range(
        &self,
        Parameters(params): Parameters<tools::WriteRangeParams>,
    ) -> Result<Json<WriteRangeResponse>, McpError> {
        self.ensure_tool_enabled("write_range")?;
        tools::write_range(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(name = "insert_rows", description = "Insert rows before idx (1-based)")]
    pub async fn insert_rows(
        &self,
        Parameters(params): Parameters<tools::StructuralEditParams>,
    ) -> Result<Json<StructuralEditResponse>, McpError> {
        self.ensure_tool_enabled("insert_rows")?;
        tools::insert_rows(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(name = "delete_rows", description = "Delete rows from idx (1-based)")]
    pub async fn delete_rows(
        &self,
        Parameters(params): Parameters<tools::StructuralEditParams>,
    ) -> Result<Json<StructuralEditResponse>, McpError> {
        self.ensure_tool_enabled("delete_rows")?;
        tools::delete_rows(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "insert_columns",
        description = "Insert columns before idx (1-based)"
    )]
    pub async fn insert_columns(
        &self,
        Parameters(params): Parameters<tools::StructuralEditParams>,
    ) -> Result<Json<StructuralEditResponse>, McpError> {
        self.ensure_tool_enabled("insert_columns")?;
        tools::insert_columns(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "delete_columns",
        description = "Delete columns from idx (1-based)"
    )]
    pub async fn delete_columns(
        &self,
        Parameters(params): Parameters<tools::StructuralEditParams>,
    ) -> Result<Json<StructuralEditResponse>, McpError> {
        self.ensure_tool_enabled("delete_columns")?;
        tools::delete_columns(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(name = "rename_sheet", description = "Rename a worksheet")]
    pub async fn rename_sheet(
        &self,
        Parameters(params): Parameters<tools::RenameSheetParams>,
    ) -> Result<Json<RenameSheetResponse>, McpError> {
        self.ensure_tool_enabled("rename_sheet")?;
        tools::rename_sheet(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "delete_sheet",
        description = "Delete a worksheet (must leave at least one sheet)"
    )]
    pub async fn delete_sheet(
        &self,
        Parameters(params): Parameters<tools::DeleteSheetParams>,
    ) -> Result<Json<DeleteSheetResponse>, McpError> {
        self.ensure_tool_enabled("delete_sheet")?;
        tools::delete_sheet(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "clear_range",
        description = "Clear values in a range like A1:C10, keeping formatting"
    )]
    pub async fn clear_range(
        &self,
        Parameters(params): Parameters<tools::ClearRangeParams>,
    ) -> Result<Json<ClearRangeResponse>, McpError> {
        self.ensure_tool_enabled("clear_range")?;
        tools::clear_range(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }

    #[tool(
        name = "format_range",
        description = "Format cells in a range. fill_hex example: 'EAF2FF'"
    )]
    pub async fn format_range(
        &self,
        Parameters(params): Parameters<tools::FormatRangeParams>,
    ) -> Result<Json<FormatRangeResponse>, McpError> {
        self.ensure_tool_enabled("format_range")?;
        tools::format_range(self.state.clone(), params)
            .await
            .map(Json)
            .map_err(ExcelError::into_error_data)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for ExcelServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}
