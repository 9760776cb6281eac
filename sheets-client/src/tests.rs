#[cfg(test)]
mod tests {
    use crate::{keyword_rows, SheetsClient, HEADER_ROW, STUB_SPREADSHEET_URL};
    use axum::{
        body::Bytes,
        extract::State,
        http::{HeaderMap, Method, StatusCode, Uri},
        response::IntoResponse,
        Json, Router,
    };
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use keywordpulse_core::{CoreError, GoogleConfig, KeywordRecord, RecommendationLabel, SheetsError};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    const TEST_KEY: &str = include_str!("testdata/service_account_key.pem");
    const TIMESTAMP: &str = "2025-05-01T09:30:00Z";

    #[derive(Debug, Clone)]
    struct Recorded {
        method: Method,
        path: String,
        authorization: Option<String>,
        body: String,
    }

    #[derive(Clone, Default)]
    struct FakeGoogle {
        requests: Arc<Mutex<Vec<Recorded>>>,
        reject_share: bool,
        reject_token: bool,
    }

    impl FakeGoogle {
        fn recorded(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }

        fn find(&self, method: Method, path_fragment: &str) -> Option<Recorded> {
            self.recorded()
                .into_iter()
                .find(|r| r.method == method && r.path.contains(path_fragment))
        }
    }

    async fn handle(
        State(fake): State<FakeGoogle>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> axum::response::Response {
        let path = uri.path().to_string();
        fake.requests.lock().unwrap().push(Recorded {
            method: method.clone(),
            path: path.clone(),
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body: String::from_utf8_lossy(&body).to_string(),
        });

        if path == "/token" {
            if fake.reject_token {
                return (StatusCode::BAD_REQUEST, "invalid_grant").into_response();
            }
            return Json(json!({
                "access_token": "fake-access-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            }))
            .into_response();
        }

        if method == Method::GET && path == "/v4/spreadsheets/missing" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"code": 404, "message": "Requested entity was not found."}})),
            )
                .into_response();
        }

        if method == Method::GET && path == "/v4/spreadsheets/existing" {
            return Json(json!({
                "spreadsheetId": "existing",
                "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/existing/edit",
                "sheets": [{"properties": {"title": "Sheet1"}}]
            }))
            .into_response();
        }

        if method == Method::POST && path == "/v4/spreadsheets" {
            return Json(json!({
                "spreadsheetId": "created",
                "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/created/edit",
                "sheets": [{"properties": {"title": "Keywords"}}]
            }))
            .into_response();
        }

        if path.ends_with("/permissions") && fake.reject_share {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({"error": {"code": 403, "message": "The caller does not have permission"}})),
            )
                .into_response();
        }

        Json(json!({})).into_response()
    }

    async fn spawn_fake_google(fake: FakeGoogle) -> String {
        let app = Router::new().fallback(handle).with_state(fake);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn live_config(base: &str, spreadsheet_id: Option<&str>) -> GoogleConfig {
        let key = json!({
            "type": "service_account",
            "client_email": "pulse@test-project.iam.gserviceaccount.com",
            "private_key": TEST_KEY,
            "token_uri": format!("{}/token", base),
        });
        GoogleConfig {
            service_account: Some(BASE64.encode(key.to_string())),
            spreadsheet_id: spreadsheet_id.map(str::to_string),
            sheets_api_base: base.to_string(),
            drive_api_base: base.to_string(),
        }
    }

    fn sample_records() -> Vec<KeywordRecord> {
        vec![
            KeywordRecord {
                keyword: "coffee guide".to_string(),
                monthly_searches: 25_000,
                competition_rate: 0.25,
                score: 88,
                recommendation: RecommendationLabel::HighlyRecommended,
            },
            KeywordRecord {
                keyword: "coffee tools".to_string(),
                monthly_searches: 3_000,
                competition_rate: 0.7,
                score: 30,
                recommendation: RecommendationLabel::LowPriority,
            },
        ]
    }

    #[test]
    fn test_keyword_rows() {
        let rows = keyword_rows(&sample_records(), TIMESTAMP);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![
                json!("coffee guide"),
                json!(25_000),
                json!(0.25),
                json!(88),
                json!("Highly Recommended"),
                json!(TIMESTAMP),
            ]
        );
        assert_eq!(rows[1][4], json!("Low Priority"));
    }

    #[tokio::test]
    async fn test_stub_mode_without_credentials() {
        let client = SheetsClient::new(&GoogleConfig::default()).unwrap();
        assert!(!client.is_configured());

        let url = client
            .publish_to_sheet(&sample_records(), TIMESTAMP)
            .await
            .unwrap();
        assert_eq!(url, STUB_SPREADSHEET_URL);
    }

    #[test]
    fn test_malformed_credentials_are_rejected() {
        let config = GoogleConfig {
            service_account: Some("definitely not base64!".to_string()),
            ..GoogleConfig::default()
        };
        let result = SheetsClient::new(&config);
        assert!(matches!(
            result,
            Err(CoreError::Sheets(SheetsError::InvalidCredentials { .. }))
        ));
    }

    #[tokio::test]
    async fn test_publish_creates_spreadsheet() {
        let fake = FakeGoogle::default();
        let base = spawn_fake_google(fake.clone()).await;
        let client = SheetsClient::new(&live_config(&base, None)).unwrap();
        assert!(client.is_configured());

        let url = client
            .publish_to_sheet(&sample_records(), TIMESTAMP)
            .await
            .unwrap();
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/created/edit");

        let token = fake.find(Method::POST, "/token").unwrap();
        assert!(token.body.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
        assert!(token.body.contains("assertion="));

        let create = fake.find(Method::POST, "/v4/spreadsheets").unwrap();
        assert_eq!(
            create.authorization.as_deref(),
            Some("Bearer fake-access-token")
        );
        let create_body: Value = serde_json::from_str(&create.body).unwrap();
        assert_eq!(create_body["properties"]["title"], "KeywordPulse Analysis");

        // "Keywords" already exists on the created spreadsheet
        assert!(fake.find(Method::POST, ":batchUpdate").is_none());

        let header = fake.find(Method::PUT, "/values/").unwrap();
        let header_body: Value = serde_json::from_str(&header.body).unwrap();
        assert_eq!(header_body["values"][0], json!(HEADER_ROW));

        let append = fake.find(Method::POST, ":append").unwrap();
        let append_body: Value = serde_json::from_str(&append.body).unwrap();
        assert_eq!(append_body["values"].as_array().unwrap().len(), 2);
        assert_eq!(append_body["values"][1][0], "coffee tools");

        let share = fake
            .find(Method::POST, "/drive/v3/files/created/permissions")
            .unwrap();
        let share_body: Value = serde_json::from_str(&share.body).unwrap();
        assert_eq!(share_body, json!({"type": "anyone", "role": "reader"}));
    }

    #[tokio::test]
    async fn test_publish_reuses_configured_spreadsheet() {
        let fake = FakeGoogle::default();
        let base = spawn_fake_google(fake.clone()).await;
        let client = SheetsClient::new(&live_config(&base, Some("existing"))).unwrap();

        let url = client
            .publish_to_sheet(&sample_records(), TIMESTAMP)
            .await
            .unwrap();
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/existing/edit");

        assert!(fake
            .recorded()
            .iter()
            .all(|r| !(r.method == Method::POST && r.path == "/v4/spreadsheets")));

        let add_sheet = fake
            .find(Method::POST, "/v4/spreadsheets/existing:batchUpdate")
            .unwrap();
        let body: Value = serde_json::from_str(&add_sheet.body).unwrap();
        assert_eq!(
            body["requests"][0]["addSheet"]["properties"]["title"],
            "Keywords"
        );
    }

    #[tokio::test]
    async fn test_missing_spreadsheet_falls_back_to_create() {
        let fake = FakeGoogle::default();
        let base = spawn_fake_google(fake.clone()).await;
        let client = SheetsClient::new(&live_config(&base, Some("missing"))).unwrap();

        let url = client.publish_to_sheet(&[], TIMESTAMP).await.unwrap();
        assert_eq!(url, "https://docs.google.com/spreadsheets/d/created/edit");

        // Header only, nothing appended for an empty list
        assert!(fake.find(Method::PUT, "/values/").is_some());
        assert!(fake.find(Method::POST, ":append").is_none());
    }

    #[tokio::test]
    async fn test_downstream_rejection_is_an_error() {
        let fake = FakeGoogle {
            reject_share: true,
            ..FakeGoogle::default()
        };
        let base = spawn_fake_google(fake.clone()).await;
        let client = SheetsClient::new(&live_config(&base, None)).unwrap();

        let result = client.publish_to_sheet(&sample_records(), TIMESTAMP).await;
        match result {
            Err(CoreError::Sheets(SheetsError::ApiRejected {
                operation,
                status,
                message,
            })) => {
                assert_eq!(operation, "share spreadsheet");
                assert_eq!(status, 403);
                assert_eq!(message, "The caller does not have permission");
            }
            other => panic!("Expected ApiRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_token_exchange_failure() {
        let fake = FakeGoogle {
            reject_token: true,
            ..FakeGoogle::default()
        };
        let base = spawn_fake_google(fake.clone()).await;
        let client = SheetsClient::new(&live_config(&base, None)).unwrap();

        let result = client.publish_to_sheet(&sample_records(), TIMESTAMP).await;
        assert!(matches!(
            result,
            Err(CoreError::Sheets(SheetsError::TokenExchangeFailed { status: 400, .. }))
        ));
        assert!(fake.find(Method::POST, "/v4/spreadsheets").is_none());
    }
}
