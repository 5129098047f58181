//! Thin REST transport for the spreadsheet service.
//!
//! Token acquisition and refresh are out of scope; the caller hands over a
//! ready bearer token. No retries and no caching here: transient failures
//! are reported upward with enough category information for the caller to
//! decide what to do.

use super::{BackendError, BackendResult, SpreadsheetBackend, SpreadsheetMetadata, wire};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const METADATA_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties";
const METADATA_FIELDS_WITH_CHARTS: &str =
    "spreadsheetId,properties.title,sheets.properties,sheets.charts";

pub struct RestBackend {
    client: Client,
    base_url: String,
    token: String,
}

impl RestBackend {
    pub fn new(base_url: Option<String>, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            token,
        }
    }

    fn url(&self, spreadsheet_id: &str, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, spreadsheet_id, suffix)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string(), e.is_timeout()))?;

        let status = response.status();
        if !status.is_success() {
            let message = extract_error_message(response).await;
            return Err(BackendError::status(status.as_u16(), message));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::transport(format!("malformed response body: {e}"), false))
    }
}

/// Pull the service's human-readable error message out of the error body,
/// falling back to the raw status text.
async fn extract_error_message(response: reqwest::Response) -> String {
    let status: StatusCode = response.status();
    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();

    match response.json::<Value>().await {
        Ok(body) => body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(fallback),
        Err(_) => fallback,
    }
}

#[async_trait]
impl SpreadsheetBackend for RestBackend {
    async fn spreadsheet_metadata(
        &self,
        spreadsheet_id: &str,
        include_charts: bool,
    ) -> BackendResult<SpreadsheetMetadata> {
        let fields = if include_charts {
            METADATA_FIELDS_WITH_CHARTS
        } else {
            METADATA_FIELDS
        };
        let request = self
            .client
            .get(self.url(spreadsheet_id, ""))
            .query(&[("fields", fields)]);
        self.send(request).await
    }

    async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> BackendResult<wire::ValueRange> {
        let request = self
            .client
            .get(self.url(spreadsheet_id, &format!("/values/{range}")));
        self.send(request).await
    }

    async fn batch_get_values(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> BackendResult<Vec<wire::ValueRange>> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        #[derive(Default)]
        struct BatchGetReply {
            value_ranges: Vec<wire::ValueRange>,
        }

        let query: Vec<(&str, &str)> = ranges.iter().map(|r| ("ranges", r.as_str())).collect();
        let request = self
            .client
            .get(self.url(spreadsheet_id, "/values:batchGet"))
            .query(&query);
        let reply: BatchGetReply = self.send(request).await?;
        Ok(reply.value_ranges)
    }

    async fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> BackendResult<wire::UpdateValuesReply> {
        let request = self
            .client
            .put(self.url(spreadsheet_id, &format!("/values/{range}")))
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "range": range, "values": values }));
        self.send(request).await
    }

    async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        data: Vec<wire::ValueRange>,
    ) -> BackendResult<wire::BatchUpdateValuesReply> {
        let request = self
            .client
            .post(self.url(spreadsheet_id, "/values:batchUpdate"))
            .json(&json!({ "valueInputOption": "USER_ENTERED", "data": data }));
        self.send(request).await
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<wire::Request>,
    ) -> BackendResult<wire::BatchUpdateReply> {
        let request = self
            .client
            .post(self.url(spreadsheet_id, ":batchUpdate"))
            .json(&json!({ "requests": requests, "includeSpreadsheetInResponse": false }));
        self.send(request).await
    }
}
