use crate::addressing::{fill_region, inserted_row_span};
use crate::builders::rows::build_insert_rows;
use crate::resolve::resolve_region_with_sheet;
use crate::state::AppState;
use crate::tools::param_enums::InsertPosition;
use crate::tools::values::coerce_rows;
use anyhow::{Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

fn default_count() -> u32 {
    1
}

fn default_inherit() -> bool {
    true
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct InsertRowsParams {
    pub spreadsheet_id: String,
    /// Anchor reference. Only its first row matters; `before` inserts above
    /// it, `after` inserts below it.
    pub range: String,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub position: InsertPosition,
    /// Copy the formatting of the row above the insertion point.
    #[serde(default = "default_inherit")]
    pub inherit_from_before: bool,
    /// Optional payload written into the inserted rows, starting at the
    /// anchor's first column. Array of row arrays or a JSON string holding
    /// one.
    #[serde(default)]
    pub values: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct InsertRowsResponse {
    pub sheet_title: String,
    /// Zero-based half-open row interval the new rows occupy.
    pub start_index: u32,
    pub end_index: u32,
    pub rows_inserted: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_cells: Option<i64>,
}

/// Insert rows, then optionally fill them. The fill is dispatched only after
/// the insertion succeeds so a failed insert never leaves stray values.
pub async fn insert_rows(
    state: Arc<AppState>,
    params: InsertRowsParams,
) -> Result<InsertRowsResponse> {
    if params.count == 0 {
        bail!("count must be at least 1");
    }

    let rows = match &params.values {
        Some(values) => {
            let rows = coerce_rows(values)?;
            if rows.len() as u32 > params.count {
                bail!(
                    "values has {} row(s) but only {} row(s) are being inserted",
                    rows.len(),
                    params.count
                );
            }
            Some(rows)
        }
        None => None,
    };

    let backend = state.backend();
    let (anchor, sheet) =
        resolve_region_with_sheet(backend.as_ref(), &params.spreadsheet_id, &params.range).await?;

    let span = inserted_row_span(anchor.span.start_row, params.count, params.position.into());
    let request = build_insert_rows(anchor.sheet_id, span, params.inherit_from_before);
    backend
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    let mut response = InsertRowsResponse {
        sheet_title: sheet.title.clone(),
        start_index: span.start,
        end_index: span.end,
        rows_inserted: span.len(),
        updated_range: None,
        updated_cells: None,
    };

    if let Some(rows) = rows
        && !rows.is_empty()
    {
        let target = fill_region(span.start, anchor.span.start_col, &rows);
        let reference = target.to_a1(Some(&sheet.title));
        let reply = backend
            .update_values(&params.spreadsheet_id, &reference, rows)
            .await?;
        response.updated_range = reply.updated_range;
        response.updated_cells = reply.updated_cells;
    }

    Ok(response)
}
