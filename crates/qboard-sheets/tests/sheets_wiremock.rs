use std::io::Write;

use pretty_assertions::assert_eq;
use qboard_core::{
    Column, QuestionRecord, SheetStore, StoreError, SubmittedAt, WorksheetId, COLUMNS,
};
use qboard_sheets::{SheetsConfig, SheetsStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOC: &str = "doc-123";

fn store_for(server: &MockServer) -> SheetsStore {
    let config = SheetsConfig::new(DOC).with_base_url(server.uri());
    SheetsStore::with_token(&config, "test-token").unwrap()
}

fn sheet() -> WorksheetId {
    WorksheetId::from("Sheet1")
}

#[tokio::test]
async fn read_all_parses_rows_and_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/v4/spreadsheets/doc-123/values/.*Sheet1.*!A2:C$"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A2:C5",
            "majorDimension": "ROWS",
            "values": [
                ["A", "q1", "2024-01-01 10:00:00"],
                [],
                ["B", "q2"],
                ["", "", ""]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rows = store_for(&server).read_all(&sheet(), &COLUMNS).await.unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].group.as_deref(), Some("A"));
    assert_eq!(rows[0].submitted_at.as_deref(), Some("2024-01-01 10:00:00"));
    assert!(rows[1].is_blank());
    assert_eq!(rows[2].text.as_deref(), Some("q2"));
    assert!(rows[2].submitted_at.is_none());
    assert!(rows[3].is_blank());
}

#[tokio::test]
async fn read_all_with_no_values_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A2:C1000",
            "majorDimension": "ROWS"
        })))
        .mount(&server)
        .await;

    let rows = store_for(&server).read_all(&sheet(), &COLUMNS).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn read_of_partial_span_maps_by_offset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"!B2:C$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["q1", "2024-01-01 10:00:00"]]
        })))
        .mount(&server)
        .await;

    let rows = store_for(&server)
        .read_all(&sheet(), &[Column::Text, Column::SubmittedAt])
        .await
        .unwrap();

    assert!(rows[0].group.is_none());
    assert_eq!(rows[0].text.as_deref(), Some("q1"));
}

#[tokio::test]
async fn append_posts_one_raw_row() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"!A:C:append$"))
        .and(query_param("valueInputOption", "RAW"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .and(body_json(json!({
            "majorDimension": "ROWS",
            "values": [["Team Diamond", "How do magnets work?", "2024-01-01 12:00:00"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": DOC,
            "updates": { "updatedRows": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = QuestionRecord::new(
        "Team Diamond",
        "How do magnets work?",
        SubmittedAt::parse("2024-01-01 12:00:00").unwrap(),
    );
    store_for(&server).append(&sheet(), &record).await.unwrap();
}

async fn mount_titles(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/doc-123"))
        .and(query_param("fields", "sheets.properties.title"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [
                { "properties": { "title": "Archive" } },
                { "properties": { "title": "Sheet1" } }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_first_row(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path_regex(r"!A1:C1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn startup_check_finds_worksheet_by_title() {
    let server = MockServer::start().await;
    mount_titles(&server).await;
    mount_first_row(
        &server,
        json!({ "values": [["Group", "Question", "When"]] }),
    )
    .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.probe(&sheet()).await.unwrap();

    let err = store.probe(&WorksheetId::from("Missing")).await.unwrap_err();
    assert!(matches!(err, StoreError::WorksheetNotFound(ws) if ws.as_str() == "Missing"));
}

#[tokio::test]
async fn empty_first_row_gets_header_written() {
    let server = MockServer::start().await;
    mount_titles(&server).await;
    mount_first_row(&server, json!({ "range": "Sheet1!A1:C1", "majorDimension": "ROWS" })).await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/v4/spreadsheets/doc-123/values/.*Sheet1.*!A1:C1$"))
        .and(query_param("valueInputOption", "RAW"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "majorDimension": "ROWS",
            "values": [["group", "text", "submitted_at"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updatedRows": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).probe(&sheet()).await.unwrap();
}

#[tokio::test]
async fn question_in_first_row_is_misconfiguration() {
    let server = MockServer::start().await;
    mount_titles(&server).await;
    mount_first_row(
        &server,
        json!({ "values": [["Team Diamond", "How do magnets work?", "2024-01-01 12:00:00"]] }),
    )
    .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = store_for(&server).probe(&sheet()).await.unwrap_err();
    match err {
        StoreError::Misconfigured(message) => {
            assert!(message.contains("unexpected header row"));
            assert!(message.contains("2024-01-01 12:00:00"));
        }
        other => panic!("expected Misconfigured, got {other:?}"),
    }
}

#[tokio::test]
async fn no_header_rows_skips_first_row_check() {
    let server = MockServer::start().await;
    mount_titles(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = SheetsConfig::new(DOC).with_base_url(server.uri());
    config.header_rows = 0;
    let store = SheetsStore::with_token(&config, "t").unwrap();

    store.probe(&sheet()).await.unwrap();
}

#[tokio::test]
async fn permission_denied_is_misconfiguration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let err = store_for(&server).probe(&sheet()).await.unwrap_err();
    match err {
        StoreError::Misconfigured(message) => {
            assert!(message.contains("The caller does not have permission"));
        }
        other => panic!("expected Misconfigured, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_transient_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .read_all(&sheet(), &COLUMNS)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Backend { status: Some(500), .. }));
    assert!(err.is_transient());
    assert!(err.to_string().contains("backend exploded"));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = SheetsConfig::new(DOC).with_base_url(server.uri());
    config.timeout_secs = 1;
    let store = SheetsStore::with_token(&config, "t").unwrap();

    let record = QuestionRecord::new("A", "q", SubmittedAt::parse("2024-01-01 12:00:00").unwrap());
    let err = store.append(&sheet(), &record).await.unwrap_err();
    assert!(matches!(err, StoreError::Timeout(_)));
}

#[tokio::test]
async fn token_file_is_reread_for_each_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer first-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["A", "q1", "2024-01-01 10:00:00"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer rotated-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["A", "q1", "2024-01-01 10:00:00"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut token = tempfile::NamedTempFile::new().unwrap();
    writeln!(token, "first-token").unwrap();

    let config = SheetsConfig::new(DOC)
        .with_base_url(server.uri())
        .with_token_file(token.path());
    let store = SheetsStore::from_config(&config).unwrap();

    store.read_all(&sheet(), &COLUMNS).await.unwrap();

    std::fs::write(token.path(), "rotated-token\n").unwrap();
    let rows = store.read_all(&sheet(), &COLUMNS).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn missing_token_file_fails_at_construction() {
    let config = SheetsConfig::new(DOC)
        .with_base_url("http://127.0.0.1:9")
        .with_token_file("/nonexistent/qboard-token");

    assert!(matches!(
        SheetsStore::from_config(&config),
        Err(qboard_sheets::SheetsError::Config(_))
    ));
}
