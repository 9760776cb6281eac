use keywordpulse_core::{CoreError, SheetsError};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetInfo {
    pub spreadsheet_id: String,
    pub spreadsheet_url: String,
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

impl SpreadsheetInfo {
    pub fn has_worksheet(&self, title: &str) -> bool {
        self.sheets.iter().any(|sheet| sheet.properties.title == title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetProperties {
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Thin wrapper over the Sheets v4 and Drive v3 REST endpoints.
#[derive(Debug, Clone)]
pub struct SheetsApi {
    http_client: Client,
    sheets_base: String,
    drive_base: String,
}

impl SheetsApi {
    pub fn new(sheets_base: &str, drive_base: &str) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            sheets_base: sheets_base.trim_end_matches('/').to_string(),
            drive_base: drive_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    async fn execute(&self, operation: &str, request: RequestBuilder) -> Result<Response, CoreError> {
        let start_time = Instant::now();
        debug!("Sending Sheets request: {}", operation);

        let response = request.send().await.map_err(|e| {
            error!("Network error during {}: {}", operation, e);
            CoreError::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(
                "{} succeeded with {} in {:?}",
                operation,
                status,
                start_time.elapsed()
            );
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|parsed| parsed.error.message)
            .unwrap_or(body);

        error!("{} failed with status {}: {}", operation, status, message);
        Err(SheetsError::ApiRejected {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        }
        .into())
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        operation: &str,
        response: Response,
    ) -> Result<T, CoreError> {
        response.json().await.map_err(|e| {
            error!("Failed to parse {} response: {}", operation, e);
            SheetsError::InvalidResponse {
                details: format!("unexpected {} response", operation),
            }
            .into()
        })
    }

    pub async fn get_spreadsheet(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
    ) -> Result<SpreadsheetInfo, CoreError> {
        let url = format!("{}/v4/spreadsheets/{}", self.sheets_base, spreadsheet_id);
        let request = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("fields", "spreadsheetId,spreadsheetUrl,sheets.properties.title")]);

        let response = match self.execute("get spreadsheet", request).await {
            Err(CoreError::Sheets(SheetsError::ApiRejected { status: 404, .. })) => {
                return Err(SheetsError::SpreadsheetNotFound {
                    spreadsheet_id: spreadsheet_id.to_string(),
                }
                .into());
            }
            other => other?,
        };

        Self::parse("get spreadsheet", response).await
    }

    pub async fn create_spreadsheet(
        &self,
        access_token: &str,
        title: &str,
        worksheet: &str,
    ) -> Result<SpreadsheetInfo, CoreError> {
        let url = format!("{}/v4/spreadsheets", self.sheets_base);
        let body = json!({
            "properties": { "title": title },
            "sheets": [{ "properties": { "title": worksheet } }],
        });
        let request = self.http_client.post(&url).bearer_auth(access_token).json(&body);

        let response = self.execute("create spreadsheet", request).await?;
        let info: SpreadsheetInfo = Self::parse("create spreadsheet", response).await?;

        info!("Created spreadsheet {}", info.spreadsheet_id);
        Ok(info)
    }

    pub async fn add_worksheet(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<(), CoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{}:batchUpdate",
            self.sheets_base, spreadsheet_id
        );
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": { "rowCount": 1000, "columnCount": 20 },
                    }
                }
            }]
        });
        let request = self.http_client.post(&url).bearer_auth(access_token).json(&body);

        self.execute("add worksheet", request).await?;
        info!("Added worksheet '{}' to {}", title, spreadsheet_id);
        Ok(())
    }

    /// Overwrites `range` with `rows`.
    pub async fn update_values(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), CoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.sheets_base, spreadsheet_id, range
        );
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        let request = self
            .http_client
            .put(&url)
            .bearer_auth(access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body);

        self.execute("update values", request).await?;
        Ok(())
    }

    /// Appends `rows` below the last non-empty row of `range`.
    pub async fn append_values(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), CoreError> {
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.sheets_base, spreadsheet_id, range
        );
        let row_count = rows.len();
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        let request = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body);

        self.execute("append values", request).await?;
        debug!("Appended {} rows to {}", row_count, spreadsheet_id);
        Ok(())
    }

    /// Grants read access to anyone holding the link.
    pub async fn share_with_anyone(&self, access_token: &str, file_id: &str) -> Result<(), CoreError> {
        let url = format!("{}/drive/v3/files/{}/permissions", self.drive_base, file_id);
        let body = json!({ "type": "anyone", "role": "reader" });
        let request = self.http_client.post(&url).bearer_auth(access_token).json(&body);

        self.execute("share spreadsheet", request).await?;
        Ok(())
    }
}
