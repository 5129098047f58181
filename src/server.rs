use crate::config::ServerConfig;
use crate::envelope::CommandEnvelope;
use crate::state::AppState;
use crate::tools;
use anyhow::{Result, anyhow};
use rmcp::{
    ErrorData as McpError, Json, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use {once_cell::sync::Lazy, regex::Regex};

const INSTRUCTIONS: &str = "\
Sheetwire MCP: named commands over a remote spreadsheet service.

Every tool returns a uniform envelope: {success:true, data} on success, or
{success:false, error, code} when the command or the backend fails. Codes:
INVALID_RANGE, SHEET_NOT_FOUND, AUTHENTICATION_FAILED, PERMISSION_DENIED,
RESOURCE_NOT_FOUND, INVALID_ARGUMENT, QUOTA_EXCEEDED, TRANSIENT_NETWORK,
BACKEND_ERROR.

RANGES: A1 notation, optionally sheet-qualified ('My Sheet'!A1:C10).
Unqualified ranges target the first sheet. Open-ended ranges (A2:B, A:C)
are allowed; bare column or row references (A, 1:5) are not.

VALUES: read_range / batch_read_ranges fetch raw values. update_range /
batch_update_ranges write arrays of row arrays; a bounded target range must
match the payload height exactly.

STRUCTURE: list_sheets, add_sheet (returns the new sheet_id), delete_sheet,
duplicate_sheet, insert_rows (position=before|after an anchor row, optional
fill payload).

FORMATTING: format_cells (colors as RRGGBB/#RRGGBB/AARRGGBB; only fields
you pass are touched), update_borders (styles: NONE, DOTTED, DASHED, SOLID,
SOLID_MEDIUM, SOLID_THICK, DOUBLE), merge_cells / unmerge_cells.

CHARTS: create_chart (chart_type pie takes exactly one series; others take
many; the label domain defaults to column A over the first series' rows),
update_chart (only the fields you pass change; the chart family cannot
change), delete_chart.";

#[derive(Clone)]
pub struct SheetServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<SheetServer>,
}

impl SheetServer {
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

    fn ensure_tool_enabled(&self, tool: &str) -> Result<()> {
        tracing::info!(tool = tool, "tool invocation requested");
        if self.state.config().is_tool_enabled(tool) {
            Ok(())
        } else {
            Err(ToolDisabledError::new(tool).into())
        }
    }

    async fn run_tool_with_timeout<T, F>(&self, tool: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(timeout_duration) = self.state.config().tool_timeout() {
            match tokio::time::timeout(timeout_duration, fut).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!(
                    "tool '{}' timed out after {}ms",
                    tool,
                    timeout_duration.as_millis()
                )),
            }
        } else {
            fut.await
        }
    }

    fn ensure_response_size<T: Serialize>(&self, tool: &str, value: &T) -> Result<()> {
        let Some(limit) = self.state.config().max_response_bytes() else {
            return Ok(());
        };
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow!("failed to serialize response for {}: {}", tool, e))?;
        if payload.len() > limit {
            return Err(ResponseTooLargeError::new(tool, payload.len(), limit).into());
        }
        Ok(())
    }

    /// Run a command and fold its outcome into the envelope. Caller mistakes
    /// (bad parameter shapes) surface as MCP invalid-params errors; command
    /// and backend failures come back as `{success:false, error, code}` so
    /// the caller can branch on the code.
    async fn dispatch<T, F>(&self, tool: &str, fut: F) -> Result<Json<CommandEnvelope>, McpError>
    where
        F: Future<Output = Result<T>>,
        T: Serialize,
    {
        match self.run_tool_with_timeout(tool, fut).await {
            Ok(value) => {
                let envelope =
                    CommandEnvelope::success(value).map_err(|e| to_mcp_error_for_tool(tool, e))?;
                self.ensure_response_size(tool, &envelope)
                    .map_err(|e| to_mcp_error_for_tool(tool, e))?;
                Ok(Json(envelope))
            }
            Err(error) => {
                if error.is::<ToolDisabledError>()
                    || error.is::<ResponseTooLargeError>()
                    || error.is::<serde_json::Error>()
                    || looks_like_invalid_params(&error.to_string())
                {
                    return Err(to_mcp_error_for_tool(tool, error));
                }
                let envelope = CommandEnvelope::failure(&error);
                tracing::warn!(
                    tool = tool,
                    code = envelope.code.as_deref().unwrap_or(""),
                    "tool failed: {error:#}"
                );
                Ok(Json(envelope))
            }
        }
    }
}

#[tool_router]
impl SheetServer {
    #[tool(name = "read_range", description = "Read cell values from an A1 range")]
    pub async fn read_range(
        &self,
        Parameters(params): Parameters<tools::values::ReadRangeParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("read_range")
            .map_err(|e| to_mcp_error_for_tool("read_range", e))?;
        self.dispatch(
            "read_range",
            tools::values::read_range(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "batch_read_ranges",
        description = "Read cell values from several A1 ranges in one call"
    )]
    pub async fn batch_read_ranges(
        &self,
        Parameters(params): Parameters<tools::values::BatchReadRangesParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("batch_read_ranges")
            .map_err(|e| to_mcp_error_for_tool("batch_read_ranges", e))?;
        self.dispatch(
            "batch_read_ranges",
            tools::values::batch_read_ranges(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "update_range",
        description = "Write an array of row arrays into an A1 range"
    )]
    pub async fn update_range(
        &self,
        Parameters(params): Parameters<tools::values::UpdateRangeParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("update_range")
            .map_err(|e| to_mcp_error_for_tool("update_range", e))?;
        self.dispatch(
            "update_range",
            tools::values::update_range(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "batch_update_ranges",
        description = "Write several ranges in one call"
    )]
    pub async fn batch_update_ranges(
        &self,
        Parameters(params): Parameters<tools::values::BatchUpdateRangesParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("batch_update_ranges")
            .map_err(|e| to_mcp_error_for_tool("batch_update_ranges", e))?;
        self.dispatch(
            "batch_update_ranges",
            tools::values::batch_update_ranges(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "insert_rows",
        description = "Insert rows before or after an anchor row, optionally filling them"
    )]
    pub async fn insert_rows(
        &self,
        Parameters(params): Parameters<tools::rows::InsertRowsParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("insert_rows")
            .map_err(|e| to_mcp_error_for_tool("insert_rows", e))?;
        self.dispatch(
            "insert_rows",
            tools::rows::insert_rows(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "list_sheets", description = "List sheets with ids and bounds")]
    pub async fn list_sheets(
        &self,
        Parameters(params): Parameters<tools::sheets::ListSheetsParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("list_sheets")
            .map_err(|e| to_mcp_error_for_tool("list_sheets", e))?;
        self.dispatch(
            "list_sheets",
            tools::sheets::list_sheets(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "add_sheet",
        description = "Add a sheet and return its backend-assigned id"
    )]
    pub async fn add_sheet(
        &self,
        Parameters(params): Parameters<tools::sheets::AddSheetParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("add_sheet")
            .map_err(|e| to_mcp_error_for_tool("add_sheet", e))?;
        self.dispatch(
            "add_sheet",
            tools::sheets::add_sheet(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "delete_sheet", description = "Delete a sheet by name")]
    pub async fn delete_sheet(
        &self,
        Parameters(params): Parameters<tools::sheets::DeleteSheetParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("delete_sheet")
            .map_err(|e| to_mcp_error_for_tool("delete_sheet", e))?;
        self.dispatch(
            "delete_sheet",
            tools::sheets::delete_sheet(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "duplicate_sheet", description = "Duplicate a sheet by name")]
    pub async fn duplicate_sheet(
        &self,
        Parameters(params): Parameters<tools::sheets::DuplicateSheetParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("duplicate_sheet")
            .map_err(|e| to_mcp_error_for_tool("duplicate_sheet", e))?;
        self.dispatch(
            "duplicate_sheet",
            tools::sheets::duplicate_sheet(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "format_cells",
        description = "Apply cell formatting to a range; only passed fields are touched"
    )]
    pub async fn format_cells(
        &self,
        Parameters(params): Parameters<tools::format::FormatCellsParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("format_cells")
            .map_err(|e| to_mcp_error_for_tool("format_cells", e))?;
        self.dispatch(
            "format_cells",
            tools::format::format_cells(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "update_borders",
        description = "Set border styles on the edges of a range"
    )]
    pub async fn update_borders(
        &self,
        Parameters(params): Parameters<tools::format::UpdateBordersParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("update_borders")
            .map_err(|e| to_mcp_error_for_tool("update_borders", e))?;
        self.dispatch(
            "update_borders",
            tools::format::update_borders(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "merge_cells", description = "Merge cells in a range")]
    pub async fn merge_cells(
        &self,
        Parameters(params): Parameters<tools::format::MergeCellsParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("merge_cells")
            .map_err(|e| to_mcp_error_for_tool("merge_cells", e))?;
        self.dispatch(
            "merge_cells",
            tools::format::merge_cells(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "unmerge_cells", description = "Unmerge all merges in a range")]
    pub async fn unmerge_cells(
        &self,
        Parameters(params): Parameters<tools::format::UnmergeCellsParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("unmerge_cells")
            .map_err(|e| to_mcp_error_for_tool("unmerge_cells", e))?;
        self.dispatch(
            "unmerge_cells",
            tools::format::unmerge_cells(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "create_chart",
        description = "Create an embedded chart from one or more series ranges"
    )]
    pub async fn create_chart(
        &self,
        Parameters(params): Parameters<tools::chart::CreateChartParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("create_chart")
            .map_err(|e| to_mcp_error_for_tool("create_chart", e))?;
        self.dispatch(
            "create_chart",
            tools::chart::create_chart(self.state.clone(), params),
        )
        .await
    }

    #[tool(
        name = "update_chart",
        description = "Update an existing chart; unspecified fields are preserved"
    )]
    pub async fn update_chart(
        &self,
        Parameters(params): Parameters<tools::chart::UpdateChartParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("update_chart")
            .map_err(|e| to_mcp_error_for_tool("update_chart", e))?;
        self.dispatch(
            "update_chart",
            tools::chart::update_chart(self.state.clone(), params),
        )
        .await
    }

    #[tool(name = "delete_chart", description = "Delete an embedded chart by id")]
    pub async fn delete_chart(
        &self,
        Parameters(params): Parameters<tools::chart::DeleteChartParams>,
    ) -> Result<Json<CommandEnvelope>, McpError> {
        self.ensure_tool_enabled("delete_chart")
            .map_err(|e| to_mcp_error_for_tool("delete_chart", e))?;
        self.dispatch(
            "delete_chart",
            tools::chart::delete_chart(self.state.clone(), params),
        )
        .await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SheetServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}

fn to_mcp_error_for_tool(tool: &str, error: anyhow::Error) -> McpError {
    if error.is::<ToolDisabledError>() || error.is::<ResponseTooLargeError>() {
        return McpError::invalid_request(error.to_string(), None);
    }

    if let Some(serde_err) = error.downcast_ref::<serde_json::Error>() {
        let problem = serde_err.to_string();
        let variants = extract_expected_variants(&problem);
        let msg = format_invalid_params_message(
            tool,
            &problem,
            if variants.is_empty() {
                None
            } else {
                Some(&variants)
            },
            tool_minimal_example(tool),
        );
        return McpError::invalid_params(msg, None);
    }

    // Heuristic fallback for user-caused shape/enum mistakes raised as plain
    // anyhow errors rather than serde_json::Error.
    let problem = error.to_string();
    if looks_like_invalid_params(&problem) {
        let variants = extract_expected_variants(&problem);
        let msg = format_invalid_params_message(
            tool,
            &problem,
            if variants.is_empty() {
                None
            } else {
                Some(&variants)
            },
            tool_minimal_example(tool),
        );
        return McpError::invalid_params(msg, None);
    }

    McpError::internal_error(problem, None)
}

fn format_invalid_params_message(
    tool: &str,
    problem: &str,
    variants: Option<&[String]>,
    example: Option<&'static str>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Invalid params for tool '{tool}': {problem}"));

    if let Some(variants) = variants
        && !variants.is_empty()
    {
        out.push_str("\nvalid variants: ");
        out.push_str(&variants.join(", "));
    }

    if let Some(example) = example {
        out.push_str("\nexample: ");
        out.push_str(example);
    }

    out
}

fn tool_minimal_example(tool: &str) -> Option<&'static str> {
    match tool {
        "update_range" => Some(
            r#"{"spreadsheet_id":"<id>","range":"Sheet1!A1:B2","values":[["a","b"],[1,2]]}"#,
        ),
        "insert_rows" => Some(
            r#"{"spreadsheet_id":"<id>","range":"Sheet1!A5","count":2,"position":"after"}"#,
        ),
        "format_cells" => Some(
            r##"{"spreadsheet_id":"<id>","range":"Sheet1!A1:C1","bold":true,"background_color":"#FFF2CC"}"##,
        ),
        "update_borders" => Some(
            r##"{"spreadsheet_id":"<id>","range":"Sheet1!A1:C10","top":{"style":"SOLID"},"bottom":{"style":"SOLID_THICK","color":"#000000"}}"##,
        ),
        "merge_cells" => Some(
            r#"{"spreadsheet_id":"<id>","range":"Sheet1!A1:C1","merge_type":"merge_all"}"#,
        ),
        "create_chart" => Some(
            r#"{"spreadsheet_id":"<id>","chart_type":"column","series":[{"range":"Sheet1!B2:B10"}],"title":"Revenue"}"#,
        ),
        _ => None,
    }
}

fn looks_like_invalid_params(problem: &str) -> bool {
    let p = problem.to_ascii_lowercase();

    // serde-driven shape/enum failures
    if p.contains("missing field")
        || p.contains("unknown field")
        || p.contains("unknown variant")
        || p.contains("did not match any variant")
        || p.contains("must be an array")
        || p.contains("must be an object")
    {
        return true;
    }

    false
}

fn extract_expected_variants(problem: &str) -> Vec<String> {
    static EXPECTED_TAIL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"expected(?: one of)? (?P<tail>.*)$").expect("regex"));
    static BACKTICK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("regex"));

    let Some(caps) = EXPECTED_TAIL_RE.captures(problem) else {
        return Vec::new();
    };
    let tail = caps.name("tail").map(|m| m.as_str()).unwrap_or("");
    BACKTICK_RE
        .captures_iter(tail)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[derive(Debug, Error)]
#[error("tool '{tool_name}' is disabled by server configuration")]
struct ToolDisabledError {
    tool_name: String,
}

impl ToolDisabledError {
    fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Error)]
#[error(
    "tool '{tool_name}' response too large ({size} bytes > {limit} bytes); reduce request size or page results"
)]
struct ResponseTooLargeError {
    tool_name: String,
    size: usize,
    limit: usize,
}

impl ResponseTooLargeError {
    fn new(tool_name: &str, size: usize, limit: usize) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
            size,
            limit,
        }
    }
}

#[cfg(test)]
mod typed_errors_tests {
    use super::{extract_expected_variants, to_mcp_error_for_tool, tool_minimal_example};
    use crate::tools;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    #[test]
    fn unknown_merge_type_is_invalid_params_with_example_and_variants() {
        let bad = json!({
            "spreadsheet_id": "s1",
            "range": "A1:C1",
            "merge_type": "sideways"
        });

        let err = serde_json::from_value::<tools::format::MergeCellsParams>(bad).unwrap_err();
        let mcp = to_mcp_error_for_tool("merge_cells", err.into());

        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp.message.to_ascii_lowercase().contains("example:"));
        assert!(mcp.message.contains("merge_all"));
    }

    #[test]
    fn missing_series_is_invalid_params() {
        let bad = json!({
            "spreadsheet_id": "s1",
            "chart_type": "column"
        });

        let err = serde_json::from_value::<tools::chart::CreateChartParams>(bad).unwrap_err();
        let mcp = to_mcp_error_for_tool("create_chart", err.into());

        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp.message.contains("series"));
    }

    #[test]
    fn minimal_examples_carry_hash_prefixed_colors() {
        let format = tool_minimal_example("format_cells").unwrap();
        assert!(format.contains("\"#FFF2CC\""));
        let borders = tool_minimal_example("update_borders").unwrap();
        assert!(borders.contains("\"#000000\""));
    }

    #[test]
    fn variant_extraction_reads_serde_tails() {
        let variants = extract_expected_variants(
            "unknown variant `sideways`, expected one of `merge_all`, `merge_rows`, `merge_columns`",
        );
        assert_eq!(variants, vec!["merge_all", "merge_rows", "merge_columns"]);
    }
}
