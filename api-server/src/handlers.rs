use crate::state::sink_mode;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::DateTime;
use keyword_engine::InsightPreferences;
use keywordpulse_core::{CoreError, KeywordCategory, KeywordRecord, RecommendationLabel};
use serde::{Deserialize, Serialize};
use telegram_client::{format_keywords_message, MessageFormat, MultiSendReport};
use tracing::{info, warn};

const PLACEHOLDER_SEARCHES: u64 = 10_000;
const PLACEHOLDER_COMPETITION: f64 = 0.5;
const PLACEHOLDER_SCORE: u8 = 75;
const DEFAULT_TEST_MESSAGE: &str = "This is a test message from KeywordPulse.";

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sinks: SinkStatus,
}

#[derive(Serialize)]
pub struct SinkStatus {
    pub sheets: String,
    pub telegram: String,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub keywords: Vec<KeywordRecord>,
    pub cached: bool,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub keywords: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_text: String,
}

#[derive(Deserialize)]
pub struct InsightsRequest {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub preferences: Option<InsightPreferences>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub category: KeywordCategory,
    pub analysis_text: String,
}

#[derive(Deserialize)]
pub struct SyncRequest {
    pub keywords: Vec<KeywordRecord>,
    pub timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub analysis_text: String,
    #[serde(default)]
    pub format: MessageFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifySummaryRequest {
    pub keywords: Vec<KeywordRecord>,
    #[serde(default)]
    pub analysis_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyMultiRequest {
    pub chat_ids: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub format: MessageFormat,
}

#[derive(Serialize)]
pub struct NotifyMultiResponse {
    pub success: bool,
    pub data: MultiSendReport,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidateChatRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateChatResponse {
    pub success: bool,
    pub message: String,
    pub chat_id: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "KeywordPulse API. Endpoints: /api/search, /api/analyze, /api/insights, \
                  /api/sync, /api/notify, /api/notify/summary, /api/notify/multi, \
                  /api/notify/validate, /health"
            .to_string(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sinks: SinkStatus {
            sheets: sink_mode(state.sheets.is_configured()).to_string(),
            telegram: sink_mode(state.telegram.is_configured()).to_string(),
        },
    })
}

pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    let term = request.keyword.trim();

    info!("Searching related keywords for '{}'", term);
    let outcome = state.search.search(term);

    Ok(Json(SearchResponse {
        keywords: outcome.keywords,
        cached: outcome.cached,
    }))
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(request) = payload?;
    info!("Analyzing {} keywords", request.keywords.len());

    let records: Vec<KeywordRecord> = request
        .keywords
        .into_iter()
        .map(|keyword| KeywordRecord {
            keyword,
            monthly_searches: PLACEHOLDER_SEARCHES,
            competition_rate: PLACEHOLDER_COMPETITION,
            score: PLACEHOLDER_SCORE,
            recommendation: RecommendationLabel::from_score(PLACEHOLDER_SCORE),
        })
        .collect();

    Ok(Json(AnalyzeResponse {
        analysis_text: state.provider.analyze(&records),
    }))
}

pub async fn insights(
    State(state): State<AppState>,
    payload: Result<Json<InsightsRequest>, JsonRejection>,
) -> ApiResult<Json<InsightsResponse>> {
    let Json(request) = payload?;
    let preferences = request.preferences.unwrap_or_default();

    let report = state.composer.compose_insights(&request.keywords, &preferences);
    info!("Composed {} insights for {} keywords", report.category, request.keywords.len());

    Ok(Json(InsightsResponse {
        category: report.category,
        analysis_text: report.text,
    }))
}

pub async fn sync(
    State(state): State<AppState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> ApiResult<Json<SyncResponse>> {
    let Json(request) = payload?;
    validate_records(&request.keywords)?;
    if DateTime::parse_from_rfc3339(&request.timestamp).is_err() {
        return Err(ApiError::Validation(format!(
            "timestamp must be RFC 3339, got '{}'",
            request.timestamp
        )));
    }

    info!("Syncing {} keywords to spreadsheet", request.keywords.len());
    let spreadsheet_url = state
        .sheets
        .publish_to_sheet(&request.keywords, &request.timestamp)
        .await
        .map_err(|e| report(&state, e))?;

    Ok(Json(SyncResponse {
        success: true,
        spreadsheet_url: Some(spreadsheet_url),
    }))
}

pub async fn notify(
    State(state): State<AppState>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> ApiResult<Json<NotifyResponse>> {
    let Json(request) = payload?;

    let message_id = state
        .telegram
        .notify_as(&request.analysis_text, request.format)
        .await
        .map_err(|e| report(&state, e))?;

    Ok(Json(NotifyResponse {
        success: true,
        message_id: Some(message_id),
    }))
}

pub async fn notify_summary(
    State(state): State<AppState>,
    payload: Result<Json<NotifySummaryRequest>, JsonRejection>,
) -> ApiResult<Json<NotifyResponse>> {
    let Json(request) = payload?;
    validate_records(&request.keywords)?;

    let message = format_keywords_message(&request.keywords, request.analysis_text.as_deref());
    let message_id = state
        .telegram
        .notify(&message)
        .await
        .map_err(|e| report(&state, e))?;

    Ok(Json(NotifyResponse {
        success: true,
        message_id: Some(message_id),
    }))
}

pub async fn notify_multi(
    State(state): State<AppState>,
    payload: Result<Json<NotifyMultiRequest>, JsonRejection>,
) -> ApiResult<Json<NotifyMultiResponse>> {
    let Json(request) = payload?;
    let chat_ids: Vec<String> = request
        .chat_ids
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    if chat_ids.is_empty() {
        return Err(ApiError::Validation(
            "at least one chat id is required".to_string(),
        ));
    }

    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TEST_MESSAGE.to_string());

    let report = state
        .telegram
        .send_to_many(&chat_ids, &message, request.format)
        .await;
    if report.summary.failed > 0 {
        warn!(
            "{} of {} deliveries failed",
            report.summary.failed, report.summary.total
        );
    }

    Ok(Json(NotifyMultiResponse {
        success: true,
        data: report,
    }))
}

pub async fn validate_chat(
    State(state): State<AppState>,
    payload: Result<Json<ValidateChatRequest>, JsonRejection>,
) -> ApiResult<Json<ValidateChatResponse>> {
    let Json(request) = payload?;

    let validation = state
        .telegram
        .validate_chat(request.chat_id.as_deref())
        .await
        .map_err(|e| report(&state, e))?;

    Ok(Json(ValidateChatResponse {
        success: validation.valid,
        message: validation.message,
        chat_id: validation.chat_id,
    }))
}

fn validate_records(records: &[KeywordRecord]) -> ApiResult<()> {
    for record in records {
        record.validate()?;
    }
    Ok(())
}

fn report(state: &AppState, error: CoreError) -> ApiError {
    state.reporter.report_error(&error);
    ApiError::Core(error)
}
