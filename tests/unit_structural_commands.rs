mod support;

use serde_json::{Value, json};
use sheetwire_mcp::backend::wire;
use sheetwire_mcp::builders::style::StyleSpec;
use sheetwire_mcp::tools::format::{
    FormatCellsParams, MergeCellsParams, UpdateBordersParams, format_cells, merge_cells,
    update_borders,
};
use sheetwire_mcp::tools::rows::{InsertRowsParams, insert_rows};
use sheetwire_mcp::tools::sheets::{
    AddSheetParams, DeleteSheetParams, add_sheet, delete_sheet,
};
use std::sync::Arc;
use support::{Call, ScriptedBackend, sheet, state_with};

fn batch_requests(backend: &ScriptedBackend) -> Vec<Value> {
    backend
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::BatchUpdate { requests } => requests.as_array().cloned(),
            _ => None,
        })
        .flatten()
        .collect()
}

#[tokio::test]
async fn bold_only_style_touches_only_the_bold_field() {
    let backend = Arc::new(ScriptedBackend::with_sheets(vec![sheet("Sheet1", 3)]));
    let state = state_with(backend.clone());

    let style: StyleSpec = serde_json::from_value(json!({ "bold": true })).unwrap();
    format_cells(
        state,
        FormatCellsParams {
            spreadsheet_id: "sheet-1".to_string(),
            range: "A1:C1".to_string(),
            style,
        },
    )
    .await
    .unwrap();

    let requests = batch_requests(&backend);
    assert_eq!(requests.len(), 1);
    let repeat = &requests[0]["repeatCell"];
    assert_eq!(repeat["fields"], "userEnteredFormat.textFormat.bold");
    assert_eq!(
        repeat["cell"]["userEnteredFormat"]["textFormat"]["bold"],
        json!(true)
    );
    assert_eq!(repeat["range"]["sheetId"], 3);
    assert_eq!(repeat["range"]["endRowIndex"], 1);
    assert_eq!(repeat["range"]["endColumnIndex"], 3);
}

#[tokio::test]
async fn explicit_none_border_is_sent_and_absent_edges_are_omitted() {
    let backend = Arc::new(ScriptedBackend::with_sheets(vec![sheet("Sheet1", 0)]));
    let state = state_with(backend.clone());

    let params: UpdateBordersParams = serde_json::from_value(json!({
        "spreadsheet_id": "sheet-1",
        "range": "A1:B2",
        "top": { "style": "NONE" }
    }))
    .unwrap();
    update_borders(state, params).await.unwrap();

    let requests = batch_requests(&backend);
    let borders = &requests[0]["updateBorders"];
    assert_eq!(borders["top"]["style"], "NONE");
    assert!(borders.get("bottom").is_none());
    assert!(borders.get("innerHorizontal").is_none());
}

#[tokio::test]
async fn merge_defaults_to_merge_all() {
    let backend = Arc::new(ScriptedBackend::with_sheets(vec![sheet("Sheet1", 0)]));
    let state = state_with(backend.clone());

    let params: MergeCellsParams = serde_json::from_value(json!({
        "spreadsheet_id": "sheet-1",
        "range": "A1:C1"
    }))
    .unwrap();
    let response = merge_cells(state, params).await.unwrap();

    assert_eq!(response.merge_type, "merge_all");
    let requests = batch_requests(&backend);
    assert_eq!(requests[0]["mergeCells"]["mergeType"], "MERGE_ALL");
}

#[tokio::test]
async fn insert_after_lands_below_the_anchor_and_fills_the_new_rows() {
    let backend = Arc::new(ScriptedBackend::with_sheets(vec![sheet("Sheet1", 9)]));
    let state = state_with(backend.clone());

    let response = insert_rows(
        state,
        InsertRowsParams {
            spreadsheet_id: "sheet-1".to_string(),
            range: "Sheet1!A5".to_string(),
            count: 2,
            position: serde_json::from_value(json!("after")).unwrap(),
            inherit_from_before: true,
            values: Some(json!([[1, 2], [3, 4]])),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.start_index, 5);
    assert_eq!(response.end_index, 7);

    let requests = batch_requests(&backend);
    let dimension = &requests[0]["insertDimension"];
    assert_eq!(dimension["range"]["sheetId"], 9);
    assert_eq!(dimension["range"]["startIndex"], 5);
    assert_eq!(dimension["range"]["endIndex"], 7);
    assert_eq!(dimension["inheritFromBefore"], json!(true));

    // The fill is dispatched after the insert and addresses the new rows.
    let calls = backend.calls();
    assert_eq!(
        calls.last(),
        Some(&Call::UpdateValues {
            range: "Sheet1!A6:B7".to_string(),
            row_count: 2,
        })
    );
}

#[tokio::test]
async fn oversized_fill_payload_is_rejected_before_inserting() {
    let backend = Arc::new(ScriptedBackend::with_sheets(vec![sheet("Sheet1", 9)]));
    let state = state_with(backend.clone());

    let err = insert_rows(
        state,
        InsertRowsParams {
            spreadsheet_id: "sheet-1".to_string(),
            range: "Sheet1!A5".to_string(),
            count: 1,
            position: serde_json::from_value(json!("after")).unwrap(),
            inherit_from_before: true,
            values: Some(json!([[1], [2]])),
        },
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("2 row(s)"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn add_sheet_returns_the_backend_assigned_id() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.queue_batch_reply(wire::BatchUpdateReply {
        spreadsheet_id: "sheet-1".to_string(),
        replies: vec![wire::Reply {
            add_sheet: Some(wire::AddSheetReply {
                properties: wire::SheetProperties {
                    sheet_id: Some(314),
                    title: Some("Forecast".to_string()),
                    ..wire::SheetProperties::default()
                },
            }),
            ..wire::Reply::default()
        }],
    });
    let state = state_with(backend.clone());

    let response = add_sheet(
        state,
        AddSheetParams {
            spreadsheet_id: "sheet-1".to_string(),
            title: "Forecast".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.sheet_id, 314);
    assert_eq!(response.title, "Forecast");
}

#[tokio::test]
async fn delete_sheet_resolves_the_name_first() {
    let backend = Arc::new(ScriptedBackend::with_sheets(vec![
        sheet("Sheet1", 0),
        sheet("Scratch", 88),
    ]));
    let state = state_with(backend.clone());

    let response = delete_sheet(
        state,
        DeleteSheetParams {
            spreadsheet_id: "sheet-1".to_string(),
            sheet_name: "Scratch".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.deleted_sheet_id, 88);
    let requests = batch_requests(&backend);
    assert_eq!(requests[0]["deleteSheet"]["sheetId"], 88);
}
