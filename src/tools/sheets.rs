use crate::backend::wire;
use crate::resolve::resolve_sheet;
use crate::state::AppState;
use anyhow::{Result, anyhow, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListSheetsParams {
    pub spreadsheet_id: String,
}

#[derive(Debug, Serialize)]
pub struct SheetSummary {
    pub title: String,
    pub sheet_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_count: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListSheetsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sheets: Vec<SheetSummary>,
}

pub async fn list_sheets(
    state: Arc<AppState>,
    params: ListSheetsParams,
) -> Result<ListSheetsResponse> {
    let metadata = state
        .backend()
        .spreadsheet_metadata(&params.spreadsheet_id, false)
        .await?;

    let sheets = metadata
        .sheets
        .iter()
        .map(|sheet| {
            let properties = &sheet.properties;
            let grid = properties.grid_properties.as_ref();
            SheetSummary {
                title: properties.title.clone().unwrap_or_default(),
                sheet_id: properties.sheet_id.unwrap_or_default(),
                index: properties.index,
                row_count: grid.and_then(|g| g.row_count),
                column_count: grid.and_then(|g| g.column_count),
            }
        })
        .collect();

    Ok(ListSheetsResponse {
        title: metadata.title,
        sheets,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddSheetParams {
    pub spreadsheet_id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct AddSheetResponse {
    /// Backend-assigned id of the new sheet; feed this into follow-up calls
    /// instead of re-resolving by name.
    pub sheet_id: i64,
    pub title: String,
}

pub async fn add_sheet(state: Arc<AppState>, params: AddSheetParams) -> Result<AddSheetResponse> {
    if params.title.trim().is_empty() {
        bail!("title must not be empty");
    }

    let request = wire::Request::AddSheet(wire::AddSheetRequest {
        properties: wire::SheetProperties {
            title: Some(params.title.clone()),
            ..wire::SheetProperties::default()
        },
    });

    let reply = state
        .backend()
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    let properties = reply
        .replies
        .first()
        .and_then(|r| r.add_sheet.as_ref())
        .map(|r| &r.properties)
        .ok_or_else(|| anyhow!("backend reply did not include the created sheet"))?;

    Ok(AddSheetResponse {
        sheet_id: properties.sheet_id.unwrap_or_default(),
        title: properties.title.clone().unwrap_or(params.title),
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteSheetParams {
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteSheetResponse {
    pub deleted_sheet_id: i64,
}

pub async fn delete_sheet(
    state: Arc<AppState>,
    params: DeleteSheetParams,
) -> Result<DeleteSheetResponse> {
    let backend = state.backend();
    let sheet = resolve_sheet(
        backend.as_ref(),
        &params.spreadsheet_id,
        Some(&params.sheet_name),
    )
    .await?;

    let request = wire::Request::DeleteSheet(wire::DeleteSheetRequest {
        sheet_id: sheet.sheet_id,
    });
    backend
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    Ok(DeleteSheetResponse {
        deleted_sheet_id: sheet.sheet_id,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DuplicateSheetParams {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    #[serde(default)]
    pub new_sheet_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DuplicateSheetResponse {
    pub source_sheet_id: i64,
    pub sheet_id: i64,
    pub title: String,
}

pub async fn duplicate_sheet(
    state: Arc<AppState>,
    params: DuplicateSheetParams,
) -> Result<DuplicateSheetResponse> {
    let backend = state.backend();
    let source = resolve_sheet(
        backend.as_ref(),
        &params.spreadsheet_id,
        Some(&params.sheet_name),
    )
    .await?;

    let request = wire::Request::DuplicateSheet(wire::DuplicateSheetRequest {
        source_sheet_id: source.sheet_id,
        insert_sheet_index: None,
        new_sheet_name: params.new_sheet_name,
    });

    let reply = state
        .backend()
        .batch_update(&params.spreadsheet_id, vec![request])
        .await?;

    let properties = reply
        .replies
        .first()
        .and_then(|r| r.duplicate_sheet.as_ref())
        .map(|r| &r.properties)
        .ok_or_else(|| anyhow!("backend reply did not include the duplicated sheet"))?;

    Ok(DuplicateSheetResponse {
        source_sheet_id: source.sheet_id,
        sheet_id: properties.sheet_id.unwrap_or_default(),
        title: properties.title.clone().unwrap_or_default(),
    })
}
