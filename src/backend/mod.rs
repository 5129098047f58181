pub mod rest;
pub mod wire;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure reported by the transport or the backend service itself. The
/// envelope layer classifies these into the user-facing error kinds; this
/// layer only records what the backend said.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend transport failure: {message}")]
    Transport { message: String, timed_out: bool },
}

impl BackendError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        Self::Transport {
            message: message.into(),
            timed_out,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Spreadsheet metadata as returned by the backend: sheet identities, grid
/// bounds, and (when requested) embedded charts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpreadsheetMetadata {
    pub spreadsheet_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sheets: Vec<SheetMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetMetadata {
    pub properties: wire::SheetProperties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub charts: Vec<wire::EmbeddedChart>,
}

/// Opaque authenticated handle to the remote spreadsheet service. The
/// translation layer only ever talks to the backend through this seam;
/// transport, auth refresh, and rate limiting all live behind it.
#[async_trait]
pub trait SpreadsheetBackend: Send + Sync {
    /// Fetch sheet identities and grid bounds for one spreadsheet.
    /// `include_charts` additionally pulls each sheet's embedded charts
    /// (needed for read-modify-write chart updates).
    async fn spreadsheet_metadata(
        &self,
        spreadsheet_id: &str,
        include_charts: bool,
    ) -> BackendResult<SpreadsheetMetadata>;

    async fn get_values(&self, spreadsheet_id: &str, range: &str)
    -> BackendResult<wire::ValueRange>;

    async fn batch_get_values(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> BackendResult<Vec<wire::ValueRange>>;

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> BackendResult<wire::UpdateValuesReply>;

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: Vec<wire::ValueRange>,
    ) -> BackendResult<wire::BatchUpdateValuesReply>;

    /// Dispatch an ordered list of structural operations in one call. The
    /// backend applies them as a unit; per-request replies come back in the
    /// same order.
    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<wire::Request>,
    ) -> BackendResult<wire::BatchUpdateReply>;
}
