pub mod api;
pub mod auth;

#[cfg(test)]
mod tests;

pub use api::{SheetsApi, SpreadsheetInfo};
pub use auth::ServiceAccountKey;

use keywordpulse_core::{CoreError, GoogleConfig, KeywordRecord, SheetsError};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Returned instead of a real URL when no service account is configured.
pub const STUB_SPREADSHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/test-sheet-id/edit#gid=0";
pub const SPREADSHEET_TITLE: &str = "KeywordPulse Analysis";
pub const WORKSHEET_TITLE: &str = "Keywords";
pub const HEADER_ROW: [&str; 6] = [
    "Keyword",
    "Monthly Searches",
    "Competition Rate",
    "Score",
    "Recommendation",
    "Date",
];

/// Spreadsheet sink. Without credentials every publish returns
/// [`STUB_SPREADSHEET_URL`].
#[derive(Debug, Clone)]
pub struct SheetsClient {
    api: SheetsApi,
    credentials: Option<ServiceAccountKey>,
    spreadsheet_id: Option<String>,
}

impl SheetsClient {
    pub fn new(config: &GoogleConfig) -> Result<Self, CoreError> {
        let credentials = config
            .service_account
            .as_deref()
            .map(ServiceAccountKey::from_encoded)
            .transpose()?;

        if credentials.is_none() {
            warn!("GOOGLE_SERVICE_ACCOUNT is not set, spreadsheet sync runs in test mode");
        }

        Ok(Self {
            api: SheetsApi::new(&config.sheets_api_base, &config.drive_api_base)?,
            credentials,
            spreadsheet_id: config.spreadsheet_id.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Writes the header and one row per record, shares the spreadsheet
    /// publicly, and returns its URL.
    pub async fn publish_to_sheet(
        &self,
        records: &[KeywordRecord],
        timestamp: &str,
    ) -> Result<String, CoreError> {
        let Some(credentials) = &self.credentials else {
            info!("Test mode: returning stub spreadsheet URL");
            return Ok(STUB_SPREADSHEET_URL.to_string());
        };

        let token = auth::fetch_access_token(self.api.http_client(), credentials).await?;
        let spreadsheet = self.open_or_create(&token).await?;
        let spreadsheet_id = spreadsheet.spreadsheet_id.as_str();

        if !spreadsheet.has_worksheet(WORKSHEET_TITLE) {
            self.api
                .add_worksheet(&token, spreadsheet_id, WORKSHEET_TITLE)
                .await?;
        }

        let header = HEADER_ROW.iter().map(|h| json!(h)).collect();
        self.api
            .update_values(
                &token,
                spreadsheet_id,
                &format!("{}!A1:F1", WORKSHEET_TITLE),
                vec![header],
            )
            .await?;

        if !records.is_empty() {
            self.api
                .append_values(
                    &token,
                    spreadsheet_id,
                    &format!("{}!A:F", WORKSHEET_TITLE),
                    keyword_rows(records, timestamp),
                )
                .await?;
        }

        self.api.share_with_anyone(&token, spreadsheet_id).await?;

        info!(
            "Saved {} keywords to spreadsheet {}",
            records.len(),
            spreadsheet.spreadsheet_url
        );
        Ok(spreadsheet.spreadsheet_url)
    }

    async fn open_or_create(&self, token: &str) -> Result<SpreadsheetInfo, CoreError> {
        if let Some(id) = &self.spreadsheet_id {
            match self.api.get_spreadsheet(token, id).await {
                Ok(info) => return Ok(info),
                Err(CoreError::Sheets(SheetsError::SpreadsheetNotFound { .. })) => {
                    warn!("Spreadsheet {} not found, creating a new one", id);
                }
                Err(e) => return Err(e),
            }
        }

        self.api
            .create_spreadsheet(token, SPREADSHEET_TITLE, WORKSHEET_TITLE)
            .await
    }
}

/// One sheet row per record, stamped with the sync timestamp.
pub fn keyword_rows(records: &[KeywordRecord], timestamp: &str) -> Vec<Vec<Value>> {
    records
        .iter()
        .map(|record| {
            vec![
                json!(record.keyword),
                json!(record.monthly_searches),
                json!(record.competition_rate),
                json!(record.score),
                json!(record.recommendation.as_str()),
                json!(timestamp),
            ]
        })
        .collect()
}
