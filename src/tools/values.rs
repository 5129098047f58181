use crate::addressing::parse_reference;
use crate::backend::wire;
use crate::errors::TranslationError;
use crate::state::AppState;
use anyhow::{Result, bail};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Row payloads arrive either as a JSON array or as JSON embedded in a
/// string (common when the caller's own tool layer stringifies nested
/// parameters). Pre-parse the string form before validating shape.
pub fn coerce_rows(value: &Value) -> Result<Vec<Vec<Value>>> {
    let parsed_holder;
    let value = match value {
        Value::String(text) => {
            parsed_holder = serde_json::from_str::<Value>(text)
                .map_err(|e| anyhow::anyhow!("values is a string but not valid JSON: {e}"))?;
            &parsed_holder
        }
        other => other,
    };

    let Value::Array(rows) = value else {
        bail!("values must be an array of row arrays");
    };

    rows.iter()
        .map(|row| match row {
            Value::Array(cells) => Ok(cells.clone()),
            other => bail!("each row must be an array, got: {other}"),
        })
        .collect()
}

fn validate_reference(range: &str) -> Result<(), TranslationError> {
    parse_reference(range).map(|_| ())
}

/// Reject a payload whose height disagrees with a bounded target range
/// before anything is dispatched to the backend.
fn check_row_count(range: &str, rows: &[Vec<Value>]) -> Result<(), TranslationError> {
    let parsed = parse_reference(range)?;
    if let Some(expected) = parsed.span.height() {
        let actual = rows.len() as u32;
        if actual != expected {
            return Err(TranslationError::ValueShapeMismatch {
                range: range.to_string(),
                expected,
                actual,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadRangeParams {
    pub spreadsheet_id: String,
    /// A1 notation, optionally sheet-qualified (e.g. `'My Sheet'!A1:C10`).
    pub range: String,
}

#[derive(Debug, Serialize)]
pub struct ReadRangeResponse {
    pub range: String,
    pub values: Vec<Vec<Value>>,
    pub row_count: usize,
}

pub async fn read_range(state: Arc<AppState>, params: ReadRangeParams) -> Result<ReadRangeResponse> {
    validate_reference(&params.range)?;
    let reply = state
        .backend()
        .get_values(&params.spreadsheet_id, &params.range)
        .await?;
    Ok(ReadRangeResponse {
        range: reply.range.unwrap_or(params.range),
        row_count: reply.values.len(),
        values: reply.values,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BatchReadRangesParams {
    pub spreadsheet_id: String,
    pub ranges: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchReadRangesResponse {
    pub value_ranges: Vec<wire::ValueRange>,
}

pub async fn batch_read_ranges(
    state: Arc<AppState>,
    params: BatchReadRangesParams,
) -> Result<BatchReadRangesResponse> {
    if params.ranges.is_empty() {
        bail!("ranges must not be empty");
    }
    for range in &params.ranges {
        validate_reference(range)?;
    }
    let value_ranges = state
        .backend()
        .batch_get_values(&params.spreadsheet_id, &params.ranges)
        .await?;
    Ok(BatchReadRangesResponse { value_ranges })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateRangeParams {
    pub spreadsheet_id: String,
    pub range: String,
    /// Array of row arrays, or a JSON string containing one.
    pub values: Value,
}

#[derive(Debug, Serialize)]
pub struct UpdateRangeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_rows: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_columns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_cells: Option<i64>,
}

impl From<wire::UpdateValuesReply> for UpdateRangeResponse {
    fn from(reply: wire::UpdateValuesReply) -> Self {
        Self {
            updated_range: reply.updated_range,
            updated_rows: reply.updated_rows,
            updated_columns: reply.updated_columns,
            updated_cells: reply.updated_cells,
        }
    }
}

pub async fn update_range(
    state: Arc<AppState>,
    params: UpdateRangeParams,
) -> Result<UpdateRangeResponse> {
    let rows = coerce_rows(&params.values)?;
    if rows.is_empty() {
        bail!("values must contain at least one row");
    }
    check_row_count(&params.range, &rows)?;

    let reply = state
        .backend()
        .update_values(&params.spreadsheet_id, &params.range, rows)
        .await?;
    Ok(reply.into())
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RangeWrite {
    pub range: String,
    pub values: Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BatchUpdateRangesParams {
    pub spreadsheet_id: String,
    pub data: Vec<RangeWrite>,
}

#[derive(Debug, Serialize)]
pub struct BatchUpdateRangesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_updated_cells: Option<i64>,
    /// Per-range results in dispatch order, passed through from the backend.
    pub responses: Vec<UpdateRangeResponse>,
}

pub async fn batch_update_ranges(
    state: Arc<AppState>,
    params: BatchUpdateRangesParams,
) -> Result<BatchUpdateRangesResponse> {
    if params.data.is_empty() {
        bail!("data must not be empty");
    }

    let mut payload = Vec::with_capacity(params.data.len());
    for write in &params.data {
        let rows = coerce_rows(&write.values)?;
        check_row_count(&write.range, &rows)?;
        payload.push(wire::ValueRange {
            range: Some(write.range.clone()),
            values: rows,
        });
    }

    let reply = state
        .backend()
        .batch_update_values(&params.spreadsheet_id, payload)
        .await?;
    Ok(BatchUpdateRangesResponse {
        total_updated_cells: reply.total_updated_cells,
        responses: reply.responses.into_iter().map(Into::into).collect(),
    })
}
