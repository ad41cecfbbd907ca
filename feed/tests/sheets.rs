mod support;

use config::shared::SheetsConfig;
use feed::destination::Destination;
use feed::destination::sheets::GoogleSheetsClient;
use feed::error::ErrorKind;
use feed::types::Cell;
use secrecy::SecretString;
use serde_json::json;
use telemetry::tracing::init_test_tracing;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::support::google::{ACCESS_TOKEN, GoogleApiMock};

const SPREADSHEET_ID: &str = "spreadsheet-123";

fn client(mock: &GoogleApiMock) -> GoogleSheetsClient {
    let config = SheetsConfig {
        spreadsheet_id: SPREADSHEET_ID.to_string(),
        sheet_name: "Sheet1".to_string(),
        service_account_key: SecretString::new(mock.service_account_key()),
        api_base_url: Some(mock.sheets_base_url()),
    };

    GoogleSheetsClient::new(&config).unwrap()
}

fn spreadsheet_path() -> String {
    format!("/v4/spreadsheets/{SPREADSHEET_ID}")
}

#[tokio::test(flavor = "multi_thread")]
async fn header_row_is_read_as_formatted_values() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/'Sheet1'!1:1$"))
        .and(query_param("valueRenderOption", "FORMATTED_VALUE"))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:C1",
            "majorDimension": "ROWS",
            "values": [["id", "title", "price"]]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let headers = client(&mock).read_header_row().await.unwrap();

    assert_eq!(headers, vec!["id", "title", "price"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_sheet_has_no_headers_or_records() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/'Sheet1'(!1:1)?$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:Z1000",
            "majorDimension": "ROWS"
        })))
        .mount(&mock)
        .await;

    let client = client(&mock);

    assert!(client.read_header_row().await.unwrap().is_empty());
    assert!(client.read_records().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn records_are_numbered_from_the_second_row() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/'Sheet1'$"))
        .and(query_param("valueRenderOption", "UNFORMATTED_VALUE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "Sheet1!A1:Z1000",
            "majorDimension": "ROWS",
            "values": [
                ["id", "title"],
                [1001, "Numbered"],
                ["TS-02"],
                [],
                ["TS-04", "Last"]
            ]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let records = client(&mock).read_records().await.unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].row, 2);
    assert_eq!(records[0].get("id"), Some(&Cell::Number(1001.0)));
    assert_eq!(records[1].row, 3);
    assert_eq!(records[1].get("title"), Some(&Cell::Null));
    assert_eq!(records[2].row, 4);
    assert_eq!(records[2].get("id"), Some(&Cell::Null));
    assert!(records[2].get("id").and_then(Cell::to_product_id).is_none());
    assert_eq!(records[3].row, 5);
    assert_eq!(records[3].get("id").and_then(Cell::to_product_id).unwrap().as_str(), "TS-04");
}

#[tokio::test(flavor = "multi_thread")]
async fn append_sends_every_row_in_one_request() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"/values/'Sheet1'!A2:B2:append$"))
        .and(query_param("valueInputOption", "RAW"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .and(body_partial_json(json!({
            "values": [["A", "Product A"], ["B", "Product B"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock)
        .await;

    client(&mock)
        .append_rows(2, vec![
            vec!["A".to_string(), "Product A".to_string()],
            vec!["B".to_string(), "Product B".to_string()],
        ])
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn append_is_anchored_below_a_blank_gap() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"/values/'Sheet1'!A6:C6:append$"))
        .and(body_partial_json(json!({
            "range": "'Sheet1'!A6:C6",
            "values": [["C", "Product C", "9.99"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock)
        .await;

    client(&mock)
        .append_rows(6, vec![vec![
            "C".to_string(),
            "Product C".to_string(),
            "9.99".to_string(),
        ]])
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn append_over_the_header_row_is_refused() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    let err = client(&mock)
        .append_rows(1, vec![vec!["A".to_string()]])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_targets_the_row_across_the_header_width() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;
    let values: Vec<String> = (0..28).map(|index| index.to_string()).collect();

    Mock::given(method("PUT"))
        .and(path_regex(r"/values/'Sheet1'!A7:AB7$"))
        .and(query_param("valueInputOption", "RAW"))
        .and(body_partial_json(json!({ "values": [values.clone()] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock)
        .await;

    client(&mock).update_row(7, values).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_resolves_the_sheet_id_once() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("GET"))
        .and(path(spreadsheet_path()))
        .and(query_param("fields", "sheets.properties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Archive"}},
                {"properties": {"sheetId": 42, "title": "Sheet1"}}
            ]
        })))
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}:batchUpdate", spreadsheet_path())))
        .and(body_partial_json(json!({
            "requests": [{
                "deleteDimension": {
                    "range": {"sheetId": 42, "dimension": "ROWS", "startIndex": 4, "endIndex": 5}
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}:batchUpdate", spreadsheet_path())))
        .and(body_partial_json(json!({
            "requests": [{
                "deleteDimension": {
                    "range": {"sheetId": 42, "dimension": "ROWS", "startIndex": 2, "endIndex": 3}
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock)
        .await;

    let client = client(&mock);
    client.delete_row(5).await.unwrap();
    client.delete_row(3).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_tab_is_a_schema_error() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("GET"))
        .and(path(spreadsheet_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sheets": [{"properties": {"sheetId": 7, "title": "Other"}}]
        })))
        .mount(&mock)
        .await;

    let err = client(&mock).delete_row(2).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DestinationSchemaError);
}

#[tokio::test(flavor = "multi_thread")]
async fn header_row_cannot_be_deleted() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    let err = client(&mock).delete_row(1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[tokio::test(flavor = "multi_thread")]
async fn api_errors_are_classified_by_status() {
    init_test_tracing();
    let mock = GoogleApiMock::start().await;

    Mock::given(method("GET"))
        .and(path_regex(r"/values/'Sheet1'!1:1$"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The caller does not have permission",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&mock)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/values/'Sheet1'$"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&mock)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "Invalid range", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&mock)
        .await;

    let client = client(&mock);

    let err = client.read_header_row().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationError);
    assert!(err.message().contains("The caller does not have permission"));

    let err = client.read_records().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DestinationConnectionFailed);

    let err = client
        .append_rows(2, vec![vec!["A".to_string()]])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DestinationQueryFailed);
    assert!(err.message().contains("INVALID_ARGUMENT"));
}

#[test]
fn malformed_service_account_key_is_a_config_error() {
    let config = SheetsConfig {
        spreadsheet_id: SPREADSHEET_ID.to_string(),
        sheet_name: "Sheet1".to_string(),
        service_account_key: SecretString::new("not base64!".to_string()),
        api_base_url: None,
    };

    let err = GoogleSheetsClient::new(&config).err().unwrap();

    assert_eq!(err.kind(), ErrorKind::ConfigError);
}
