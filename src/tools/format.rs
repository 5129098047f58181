use crate::builders::borders::{BordersSpec, build_update_borders};
use crate::builders::merge::{build_merge, build_unmerge};
use crate::builders::style::{StyleSpec, build_repeat_cell};
use crate::resolve::{SheetFallback, resolve_region};
use crate::state::AppState;
use crate::tools::param_enums::MergeType;
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct StructuralUpdateResponse {
    pub spreadsheet_id: String,
    pub requests_applied: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FormatCellsParams {
    pub spreadsheet_id: String,
    /// A1 range, optionally sheet-qualified. Unqualified ranges target the
    /// first sheet.
    pub range: String,
    #[serde(flatten)]
    pub style: StyleSpec,
}

pub async fn format_cells(
    state: Arc<AppState>,
    params: FormatCellsParams,
) -> Result<StructuralUpdateResponse> {
    let backend = state.backend();
    let region = resolve_region(
        backend.as_ref(),
        &params.spreadsheet_id,
        &params.range,
        SheetFallback::First,
    )
    .await?;

    let request = build_repeat_cell(&region, &params.style)?;
    let reply = backend
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    Ok(StructuralUpdateResponse {
        spreadsheet_id: reply.spreadsheet_id,
        requests_applied: reply.replies.len(),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateBordersParams {
    pub spreadsheet_id: String,
    pub range: String,
    #[serde(flatten)]
    pub borders: BordersSpec,
}

pub async fn update_borders(
    state: Arc<AppState>,
    params: UpdateBordersParams,
) -> Result<StructuralUpdateResponse> {
    let backend = state.backend();
    let region = resolve_region(
        backend.as_ref(),
        &params.spreadsheet_id,
        &params.range,
        SheetFallback::First,
    )
    .await?;

    let request = build_update_borders(&region, &params.borders)?;
    let reply = backend
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    Ok(StructuralUpdateResponse {
        spreadsheet_id: reply.spreadsheet_id,
        requests_applied: reply.replies.len(),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergeCellsParams {
    pub spreadsheet_id: String,
    pub range: String,
    #[serde(default)]
    pub merge_type: MergeType,
}

#[derive(Debug, Serialize)]
pub struct MergeCellsResponse {
    pub spreadsheet_id: String,
    pub merge_type: String,
    pub merged_range: String,
}

pub async fn merge_cells(
    state: Arc<AppState>,
    params: MergeCellsParams,
) -> Result<MergeCellsResponse> {
    let backend = state.backend();
    let region = resolve_region(
        backend.as_ref(),
        &params.spreadsheet_id,
        &params.range,
        SheetFallback::First,
    )
    .await?;

    let request = build_merge(&region, params.merge_type);
    let reply = backend
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    Ok(MergeCellsResponse {
        spreadsheet_id: reply.spreadsheet_id,
        merge_type: params.merge_type.as_str().to_string(),
        merged_range: params.range,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UnmergeCellsParams {
    pub spreadsheet_id: String,
    pub range: String,
}

pub async fn unmerge_cells(
    state: Arc<AppState>,
    params: UnmergeCellsParams,
) -> Result<StructuralUpdateResponse> {
    let backend = state.backend();
    let region = resolve_region(
        backend.as_ref(),
        &params.spreadsheet_id,
        &params.range,
        SheetFallback::First,
    )
    .await?;

    let reply = backend
        .batch_update(&params.spreadsheet_id, vec![build_unmerge(&region)])
        .await?;

    Ok(StructuralUpdateResponse {
        spreadsheet_id: reply.spreadsheet_id,
        requests_applied: reply.replies.len(),
    })
}
