use api_server::{create_router, AppState};
use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use axum_test::TestServer;
use keyword_engine::{KeywordGenerator, KeywordSearch, EMPTY_ANALYSIS};
use keywordpulse_core::{AppConfig, GoogleConfig, TelegramConfig};
use serde_json::{json, Value};

const TEST_KEY: &str = include_str!("../../sheets-client/src/testdata/service_account_key.pem");

fn stub_server() -> TestServer {
    let state = AppState::new(&AppConfig::default())
        .expect("app state")
        .with_search(KeywordSearch::new(KeywordGenerator::with_seed(7)));
    TestServer::new(create_router(state)).unwrap()
}

fn server_with(config: AppConfig) -> TestServer {
    let state = AppState::new(&config).expect("app state");
    TestServer::new(create_router(state)).unwrap()
}

/// Serves every request with the given status and JSON body.
async fn spawn_rejecting_service(status: StatusCode, body: Value) -> String {
    let app = Router::new().fallback(move || {
        let body = body.clone();
        async move { (status, Json(body)).into_response() }
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn sample_record() -> Value {
    json!({
        "keyword": "coffee guide",
        "monthlySearches": 25000,
        "competitionRate": 0.25,
        "score": 88,
        "recommendation": "Highly Recommended"
    })
}

#[tokio::test]
async fn health_reports_stub_sinks() {
    let server = stub_server();

    let resp = server.get("/health").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sinks"]["sheets"], "stub");
    assert_eq!(body["sinks"]["telegram"], "stub");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let server = stub_server();

    let body: Value = server.get("/").await.json();
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("/api/search"));
    assert!(message.contains("/api/notify"));
}

#[tokio::test]
async fn responses_carry_request_id() {
    let server = stub_server();

    let resp = server.get("/health").await;
    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(request_id.len(), 36, "expected a UUID request id");
}

#[tokio::test]
async fn search_returns_ten_scored_keywords() {
    let server = stub_server();

    let resp = server
        .post("/api/search")
        .json(&json!({"keyword": "coffee"}))
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: Value = resp.json();
    assert_eq!(body["cached"], false);
    let keywords = body["keywords"].as_array().unwrap();
    assert_eq!(keywords.len(), 10);
    assert_eq!(keywords[0]["keyword"], "coffee marketing");
    for record in keywords {
        let score = record["score"].as_u64().unwrap();
        assert!(score <= 100);
        let rate = record["competitionRate"].as_f64().unwrap();
        assert!((0.1..=0.9).contains(&rate));
        assert!(record["recommendation"].is_string());
    }
}

#[tokio::test]
async fn search_blank_keyword_returns_suffixes() {
    let server = stub_server();

    let resp = server
        .post("/api/search")
        .json(&json!({"keyword": "   "}))
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    let keywords = body["keywords"].as_array().unwrap();
    assert_eq!(keywords.len(), 10);
    assert_eq!(keywords[0]["keyword"], "marketing");
    assert_eq!(keywords[9]["keyword"], "comparison");
}

#[tokio::test]
async fn search_rejects_malformed_body() {
    let server = stub_server();

    let resp = server
        .post("/api/search")
        .json(&json!({"term": "coffee"}))
        .await;
    assert_eq!(resp.status_code(), 422);
    let body: Value = resp.json();
    assert_eq!(body["status"], 422);
    assert!(body["detail"].as_str().unwrap().contains("keyword"));
}

#[tokio::test]
async fn analyze_uses_placeholder_metrics() {
    let server = stub_server();

    let resp = server
        .post("/api/analyze")
        .json(&json!({"keywords": ["tea", "coffee"]}))
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: Value = resp.json();
    let text = body["analysisText"].as_str().unwrap();
    assert!(text.starts_with(
        "Among the analyzed keywords, 'tea' recorded the highest recommendation score."
    ));
    assert!(text.contains("- **coffee**: 10,000 monthly searches, competition 0.50, score 75"));
    assert!(!text.contains("## Recommended Strategy"));
}

#[tokio::test]
async fn analyze_empty_list() {
    let server = stub_server();

    let body: Value = server
        .post("/api/analyze")
        .json(&json!({"keywords": []}))
        .await
        .json();
    assert_eq!(body["analysisText"], EMPTY_ANALYSIS);
}

#[tokio::test]
async fn insights_detect_category() {
    let server = stub_server();

    let resp = server
        .post("/api/insights")
        .json(&json!({"keywords": ["machine learning tools"], "preferences": {"insightCount": 2}}))
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: Value = resp.json();
    assert_eq!(body["category"], "AI Technology");
    let text = body["analysisText"].as_str().unwrap();
    assert!(text.starts_with("## machine learning tools Keyword Analysis"));
    assert!(text.contains("### Content Strategy"));
}

#[tokio::test]
async fn sync_returns_stub_url() {
    let server = stub_server();

    let resp = server
        .post("/api/sync")
        .json(&json!({"keywords": [sample_record()], "timestamp": "2025-05-01T09:30:00Z"}))
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["spreadsheetUrl"],
        "https://docs.google.com/spreadsheets/d/test-sheet-id/edit#gid=0"
    );
}

#[tokio::test]
async fn sync_rejects_bad_timestamp() {
    let server = stub_server();

    let resp = server
        .post("/api/sync")
        .json(&json!({"keywords": [sample_record()], "timestamp": "yesterday"}))
        .await;
    assert_eq!(resp.status_code(), 422);
}

#[tokio::test]
async fn sync_rejects_out_of_range_record() {
    let server = stub_server();
    let mut record = sample_record();
    record["competitionRate"] = json!(1.5);

    let resp = server
        .post("/api/sync")
        .json(&json!({"keywords": [record], "timestamp": "2025-05-01T09:30:00Z"}))
        .await;
    assert_eq!(resp.status_code(), 422);
    let body: Value = resp.json();
    assert!(body["detail"].as_str().unwrap().contains("competitionRate"));
}

#[tokio::test]
async fn sync_downstream_failure_is_500() {
    let base = spawn_rejecting_service(StatusCode::BAD_REQUEST, json!({"error": "invalid_grant"})).await;
    let key = json!({
        "client_email": "pulse@test-project.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "token_uri": format!("{}/token", base),
    });
    let server = server_with(AppConfig {
        google: GoogleConfig {
            service_account: Some(key.to_string()),
            spreadsheet_id: None,
            sheets_api_base: base.clone(),
            drive_api_base: base,
        },
        ..AppConfig::default()
    });

    let resp = server
        .post("/api/sync")
        .json(&json!({"keywords": [sample_record()], "timestamp": "2025-05-01T09:30:00Z"}))
        .await;
    assert_eq!(resp.status_code(), 500);
    let body: Value = resp.json();
    assert_eq!(body["status"], 500);
    assert!(body["detail"].as_str().unwrap().contains("Google Sheets error"));
}

#[tokio::test]
async fn notify_returns_stub_message_id() {
    let server = stub_server();

    let resp = server
        .post("/api/notify")
        .json(&json!({"analysisText": "## Report"}))
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["messageId"], "test-message-id");
}

#[tokio::test]
async fn notify_rejects_unknown_format() {
    let server = stub_server();

    let resp = server
        .post("/api/notify")
        .json(&json!({"analysisText": "hi", "format": "pdf"}))
        .await;
    assert_eq!(resp.status_code(), 422);
}

#[tokio::test]
async fn notify_downstream_failure_is_500() {
    let base = spawn_rejecting_service(
        StatusCode::BAD_REQUEST,
        json!({"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}),
    )
    .await;
    let server = server_with(AppConfig {
        telegram: TelegramConfig {
            bot_token: Some("123:fake-token".to_string()),
            chat_id: Some("-100".to_string()),
            api_base: base,
        },
        ..AppConfig::default()
    });

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["sinks"]["telegram"], "live");

    let resp = server
        .post("/api/notify")
        .json(&json!({"analysisText": "## Report"}))
        .await;
    assert_eq!(resp.status_code(), 500);
    let body: Value = resp.json();
    assert_eq!(body["status"], 500);
    assert!(body["detail"].as_str().unwrap().contains("chat not found"));
}

#[tokio::test]
async fn notify_summary_returns_stub_message_id() {
    let server = stub_server();

    let resp = server
        .post("/api/notify/summary")
        .json(&json!({"keywords": [sample_record()]}))
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["messageId"], "test-message-id");
}

#[tokio::test]
async fn notify_multi_reports_every_chat() {
    let server = stub_server();

    let resp = server
        .post("/api/notify/multi")
        .json(&json!({"chatIds": ["-100", "-200"], "format": "html"}))
        .await;
    assert_eq!(resp.status_code(), 200);

    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["summary"], json!({"total": 2, "success": 2, "failed": 0}));
    assert_eq!(body["data"]["results"]["-200"], "test-message-id");
    assert_eq!(body["data"]["errors"], json!({}));
}

#[tokio::test]
async fn notify_multi_requires_chat_ids() {
    let server = stub_server();

    let resp = server
        .post("/api/notify/multi")
        .json(&json!({"chatIds": []}))
        .await;
    assert_eq!(resp.status_code(), 422);
}

#[tokio::test]
async fn validate_without_token_is_invalid() {
    let server = stub_server();

    let resp = server
        .post("/api/notify/validate")
        .json(&json!({"chatId": "-100"}))
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["chatId"], "-100");
}

#[tokio::test]
async fn validate_without_any_chat_id_is_500() {
    let server = stub_server();

    let resp = server.post("/api/notify/validate").json(&json!({})).await;
    assert_eq!(resp.status_code(), 500);
    let body: Value = resp.json();
    assert!(body["detail"].as_str().unwrap().contains("TELEGRAM_CHAT_ID"));
}
