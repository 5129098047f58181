mod support;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::ErrorCode;
use serde_json::json;
use sheetwire_mcp::backend::BackendError;
use sheetwire_mcp::config::{CliArgs, ServerConfig};
use sheetwire_mcp::server::SheetServer;
use sheetwire_mcp::state::AppState;
use sheetwire_mcp::tools::values::{ReadRangeParams, UpdateRangeParams};
use std::sync::Arc;
use support::ScriptedBackend;

fn server_over(backend: Arc<ScriptedBackend>, args: CliArgs) -> SheetServer {
    let config = ServerConfig::from_args(CliArgs {
        token: Some("test-token".to_string()),
        ..args
    })
    .expect("test config");
    SheetServer::from_state(Arc::new(AppState::new_with_backend(
        Arc::new(config),
        backend,
    )))
}

fn read_a1_b2() -> Parameters<ReadRangeParams> {
    Parameters(ReadRangeParams {
        spreadsheet_id: "sheet-1".to_string(),
        range: "A1:B2".to_string(),
    })
}

#[tokio::test]
async fn successful_command_comes_back_in_a_success_envelope() {
    let backend = Arc::new(ScriptedBackend::new());
    let server = server_over(backend, CliArgs::default());

    let envelope = server.read_range(read_a1_b2()).await.unwrap().0;

    assert!(envelope.success);
    assert!(envelope.data.is_some());
    assert!(envelope.error.is_none());
    assert!(envelope.code.is_none());
}

#[tokio::test]
async fn backend_failure_comes_back_as_a_failed_envelope_not_a_protocol_error() {
    let backend = Arc::new(ScriptedBackend::new());
    backend.fail_next(BackendError::status(403, "forbidden"));
    let server = server_over(backend, CliArgs::default());

    let envelope = server.read_range(read_a1_b2()).await.unwrap().0;

    assert!(!envelope.success);
    assert!(envelope.data.is_none());
    assert_eq!(envelope.code.as_deref(), Some("PERMISSION_DENIED"));
    assert!(envelope.error.unwrap().contains("forbidden"));
}

#[tokio::test]
async fn disabled_tool_is_rejected_before_running() {
    let backend = Arc::new(ScriptedBackend::new());
    let server = server_over(
        backend.clone(),
        CliArgs {
            enabled_tools: Some(vec!["list_sheets".to_string()]),
            ..CliArgs::default()
        },
    );

    let err = server
        .read_range(read_a1_b2())
        .await
        .err()
        .expect("disabled tool must be refused");

    assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
    assert!(err.message.contains("disabled"));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn oversized_response_is_refused() {
    let backend = Arc::new(ScriptedBackend::new());
    let server = server_over(
        backend,
        CliArgs {
            max_response_bytes: Some(1),
            ..CliArgs::default()
        },
    );

    let err = server
        .read_range(read_a1_b2())
        .await
        .err()
        .expect("oversized response must be refused");

    assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
    assert!(err.message.contains("too large"));
}

#[tokio::test]
async fn malformed_payload_shape_is_an_invalid_params_error() {
    let backend = Arc::new(ScriptedBackend::new());
    let server = server_over(backend.clone(), CliArgs::default());

    let err = server
        .update_range(Parameters(UpdateRangeParams {
            spreadsheet_id: "sheet-1".to_string(),
            range: "A1:B2".to_string(),
            values: json!(42),
        }))
        .await
        .err()
        .expect("non-array payload must be refused");

    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("update_range"));
    assert!(backend.calls().is_empty());
}
