#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use sheetwire_mcp::backend::{
    BackendError, BackendResult, SheetMetadata, SpreadsheetBackend, SpreadsheetMetadata, wire,
};
use sheetwire_mcp::config::{CliArgs, ServerConfig};
use sheetwire_mcp::state::AppState;
use std::sync::Arc;

/// One recorded backend interaction, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Metadata { include_charts: bool },
    GetValues { range: String },
    BatchGetValues { ranges: Vec<String> },
    UpdateValues { range: String, row_count: usize },
    BatchUpdateValues { range_count: usize },
    BatchUpdate { requests: Value },
}

/// Scripted stand-in for the remote service. Replies are queued up front and
/// every call is recorded so tests can assert on exactly what was sent.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<Call>>,
    metadata: Mutex<Option<SpreadsheetMetadata>>,
    batch_replies: Mutex<Vec<wire::BatchUpdateReply>>,
    fail_with: Mutex<Option<BackendError>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheets(sheets: Vec<SheetMetadata>) -> Self {
        let backend = Self::default();
        *backend.metadata.lock() = Some(SpreadsheetMetadata {
            spreadsheet_id: "sheet-1".to_string(),
            title: Some("Test Spreadsheet".to_string()),
            sheets,
        });
        backend
    }

    pub fn queue_batch_reply(&self, reply: wire::BatchUpdateReply) {
        self.batch_replies.lock().push(reply);
    }

    pub fn fail_next(&self, error: BackendError) {
        *self.fail_with.lock() = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn metadata_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, Call::Metadata { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn take_failure(&self) -> Option<BackendError> {
        self.fail_with.lock().take()
    }
}

#[async_trait]
impl SpreadsheetBackend for ScriptedBackend {
    async fn spreadsheet_metadata(
        &self,
        _spreadsheet_id: &str,
        include_charts: bool,
    ) -> BackendResult<SpreadsheetMetadata> {
        self.record(Call::Metadata { include_charts });
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        Ok(self.metadata.lock().clone().unwrap_or_default())
    }

    async fn get_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
    ) -> BackendResult<wire::ValueRange> {
        self.record(Call::GetValues {
            range: range.to_string(),
        });
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        Ok(wire::ValueRange {
            range: Some(range.to_string()),
            values: vec![],
        })
    }

    async fn batch_get_values(
        &self,
        _spreadsheet_id: &str,
        ranges: &[String],
    ) -> BackendResult<Vec<wire::ValueRange>> {
        self.record(Call::BatchGetValues {
            ranges: ranges.to_vec(),
        });
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        Ok(ranges
            .iter()
            .map(|range| wire::ValueRange {
                range: Some(range.clone()),
                values: vec![],
            })
            .collect())
    }

    async fn update_values(
        &self,
        _spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> BackendResult<wire::UpdateValuesReply> {
        self.record(Call::UpdateValues {
            range: range.to_string(),
            row_count: values.len(),
        });
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        Ok(wire::UpdateValuesReply {
            spreadsheet_id: "sheet-1".to_string(),
            updated_range: Some(range.to_string()),
            updated_rows: Some(values.len() as i64),
            updated_columns: None,
            updated_cells: None,
        })
    }

    async fn batch_update_values(
        &self,
        _spreadsheet_id: &str,
        data: Vec<wire::ValueRange>,
    ) -> BackendResult<wire::BatchUpdateValuesReply> {
        self.record(Call::BatchUpdateValues {
            range_count: data.len(),
        });
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        Ok(wire::BatchUpdateValuesReply {
            spreadsheet_id: "sheet-1".to_string(),
            total_updated_cells: None,
            responses: vec![],
        })
    }

    async fn batch_update(
        &self,
        _spreadsheet_id: &str,
        requests: Vec<wire::Request>,
    ) -> BackendResult<wire::BatchUpdateReply> {
        let serialized = serde_json::to_value(&requests).unwrap_or(Value::Null);
        self.record(Call::BatchUpdate {
            requests: serialized,
        });
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        let mut queued = self.batch_replies.lock();
        if queued.is_empty() {
            Ok(wire::BatchUpdateReply {
                spreadsheet_id: "sheet-1".to_string(),
                replies: vec![wire::Reply::default()],
            })
        } else {
            Ok(queued.remove(0))
        }
    }
}

pub fn sheet(title: &str, sheet_id: i64) -> SheetMetadata {
    SheetMetadata {
        properties: wire::SheetProperties {
            sheet_id: Some(sheet_id),
            title: Some(title.to_string()),
            index: Some(0),
            grid_properties: Some(wire::GridProperties {
                row_count: Some(1000),
                column_count: Some(26),
            }),
        },
        charts: vec![],
    }
}

pub fn test_config() -> Arc<ServerConfig> {
    let config = ServerConfig::from_args(CliArgs {
        token: Some("test-token".to_string()),
        ..CliArgs::default()
    })
    .expect("test config");
    Arc::new(config)
}

pub fn state_with(backend: Arc<ScriptedBackend>) -> Arc<AppState> {
    Arc::new(AppState::new_with_backend(test_config(), backend))
}
