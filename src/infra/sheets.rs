use async_trait::async_trait;
use reqwest::{
    Client, Url,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::domain::row::Row;
use crate::error::{AppError, AppResult};
use crate::infra::json_rows::data_rows;
use crate::services::RowSource;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

pub struct GoogleSheetsClient {
    http: Client,
    sheet_id: Option<String>,
    range: String,
    token: Option<String>,
}

impl GoogleSheetsClient {
    pub fn new(sheet_id: Option<String>, range: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            sheet_id,
            range,
            token,
        }
    }

    fn api_details(&self) -> AppResult<(&str, &str)> {
        let sheet_id = self
            .sheet_id
            .as_deref()
            .ok_or_else(|| AppError::Configuration("sheet id not configured".to_string()))?;
        let token = self.token.as_deref().ok_or_else(|| {
            AppError::Configuration("Google access token not configured".to_string())
        })?;
        Ok((sheet_id, token))
    }

    fn values_endpoint(api_base: &str, sheet_id: &str, range: &str) -> AppResult<Url> {
        let mut url = Url::parse(api_base)
            .map_err(|err| AppError::Configuration(format!("invalid Sheets API base: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Configuration("Sheets API base cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", sheet_id, "values", range]);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE")
            .append_pair("majorDimension", "ROWS");
        Ok(url)
    }
}

#[async_trait]
impl RowSource for GoogleSheetsClient {
    async fn read_rows(&self) -> AppResult<Vec<Row>> {
        let (sheet_id, token) = self.api_details()?;
        let url = Self::values_endpoint(SHEETS_API_BASE, sheet_id, &self.range)?;
        debug!(%url, "fetching sheet values");

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::SourceUnavailable(format!("failed to call Sheets: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::SourceUnavailable(format!(
                "Sheets responded with {status}: {body}"
            )));
        }

        let payload: ValueRangeResponse = response.json().await.map_err(|err| {
            AppError::SourceUnavailable(format!("failed to parse Sheets response: {err}"))
        })?;

        let rows = data_rows(payload.values);
        info!(sheet_id, rows = rows.len(), "read ticket rows from sheet");
        Ok(rows)
    }
}

#[derive(Deserialize)]
struct ValueRangeResponse {
    // Omitted entirely when the range is blank.
    #[serde(default)]
    values: Vec<Vec<Value>>,
}
