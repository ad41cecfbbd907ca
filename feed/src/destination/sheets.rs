use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use config::shared::SheetsConfig;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::bail;
use crate::destination::Destination;
use crate::error::{ErrorKind, FeedResult};
use crate::feed_error;
use crate::types::{Cell, SheetRecord};

/// Default Sheets REST endpoint.
const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// OAuth scope granting read and write access to spreadsheets.
const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetMetadata>,
}

#[derive(Debug, Deserialize)]
struct SheetMetadata {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    status: String,
}

/// Feed sheet backed by the Google Sheets REST API.
///
/// Authenticates as a service account. The numeric id of the tab, needed to
/// delete rows, is looked up on first use and cached.
pub struct GoogleSheetsClient {
    http: reqwest::Client,
    token_provider: Arc<dyn TokenProvider>,
    spreadsheet_url: Url,
    sheet_name: String,
    sheet_id: OnceCell<i64>,
}

impl GoogleSheetsClient {
    /// Builds a client from the sheet settings, decoding the base64 service account key.
    pub fn new(config: &SheetsConfig) -> FeedResult<Self> {
        let key = STANDARD.decode(config.service_account_key.expose_secret().trim())?;
        let key = String::from_utf8(key).map_err(|err| {
            feed_error!(
                ErrorKind::ConfigError,
                "Service account key is not valid UTF-8",
                source: err
            )
        })?;
        let service_account = CustomServiceAccount::from_json(&key)?;

        Self::with_token_provider(config, Arc::new(service_account))
    }

    /// Builds a client that takes access tokens from `token_provider`.
    pub fn with_token_provider(
        config: &SheetsConfig,
        token_provider: Arc<dyn TokenProvider>,
    ) -> FeedResult<Self> {
        let base_url = config
            .api_base_url
            .as_deref()
            .unwrap_or(SHEETS_API_BASE_URL);
        let spreadsheet_url = spreadsheet_url(base_url, &config.spreadsheet_id)?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            token_provider,
            spreadsheet_url,
            sheet_name: config.sheet_name.clone(),
            sheet_id: OnceCell::new(),
        })
    }

    /// URL of `values/{range}` with an optional `:{action}` suffix.
    fn values_url(&self, range: &str, action: Option<&str>) -> Url {
        let last_segment = match action {
            Some(action) => format!("{range}:{action}"),
            None => range.to_string(),
        };

        let mut url = self.spreadsheet_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("values").push(&last_segment);
        }

        url
    }

    /// URL of the spreadsheet itself with a `:{action}` suffix on its id.
    fn spreadsheet_action_url(&self, action: &str) -> Url {
        let mut url = self.spreadsheet_url.clone();
        let id = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop().push(&format!("{id}:{action}"));
        }

        url
    }

    async fn send(&self, request: RequestBuilder) -> FeedResult<Response> {
        let token = self.token_provider.token(&[SPREADSHEETS_SCOPE]).await?;
        let response = request.bearer_auth(token.as_str()).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(error) => format!("{status}: {} ({})", error.error.message, error.error.status),
            Err(_) => format!("{status}: {body}"),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => bail!(
                ErrorKind::AuthenticationError,
                "Sheets API rejected the credentials",
                detail
            ),
            status if status.is_server_error() => bail!(
                ErrorKind::DestinationConnectionFailed,
                "Sheets API is unavailable",
                detail
            ),
            _ => bail!(
                ErrorKind::DestinationQueryFailed,
                "Sheets API request failed",
                detail
            ),
        }
    }

    async fn get_values(&self, range: &str, render_option: &str) -> FeedResult<ValueRange> {
        let request = self.http.get(self.values_url(range, None)).query(&[
            ("majorDimension", "ROWS"),
            ("valueRenderOption", render_option),
        ]);

        Ok(self.send(request).await?.json().await?)
    }

    async fn sheet_id(&self) -> FeedResult<i64> {
        self.sheet_id
            .get_or_try_init(|| self.fetch_sheet_id())
            .await
            .copied()
    }

    async fn fetch_sheet_id(&self) -> FeedResult<i64> {
        let request = self
            .http
            .get(self.spreadsheet_url.clone())
            .query(&[("fields", "sheets.properties")]);
        let metadata: SpreadsheetMetadata = self.send(request).await?.json().await?;

        let Some(sheet) = metadata
            .sheets
            .into_iter()
            .find(|sheet| sheet.properties.title == self.sheet_name)
        else {
            bail!(
                ErrorKind::DestinationSchemaError,
                "Feed sheet does not exist in the spreadsheet",
                self.sheet_name
            );
        };

        debug!(
            sheet = %self.sheet_name,
            sheet_id = sheet.properties.sheet_id,
            "resolved feed sheet id"
        );

        Ok(sheet.properties.sheet_id)
    }
}

impl Destination for GoogleSheetsClient {
    async fn read_header_row(&self) -> FeedResult<Vec<String>> {
        let range = format!("{}!1:1", quote_sheet_name(&self.sheet_name));
        let value_range = self.get_values(&range, "FORMATTED_VALUE").await?;

        let headers = value_range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|value| Cell::from(value).to_text())
            .collect();

        Ok(headers)
    }

    async fn read_records(&self) -> FeedResult<Vec<SheetRecord>> {
        let range = quote_sheet_name(&self.sheet_name);
        let value_range = self.get_values(&range, "UNFORMATTED_VALUE").await?;

        let mut rows = value_range.values.into_iter();
        let headers: Vec<String> = rows
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|value| Cell::from(value).to_text())
            .collect();

        let records = rows
            .enumerate()
            .map(|(index, row)| {
                let cells = row.into_iter().map(Cell::from).collect();
                SheetRecord::from_cells(index as u32 + 2, &headers, cells)
            })
            .collect();

        Ok(records)
    }

    async fn append_rows(&self, start_row: u32, rows: Vec<Vec<String>>) -> FeedResult<()> {
        if start_row < 2 {
            bail!(
                ErrorKind::InvalidData,
                "Refusing to append over the header row",
                format!("row {start_row}")
            );
        }

        // Table detection stops at the first blank row, so the range is pinned below the data.
        let width = rows.iter().map(Vec::len).max().unwrap_or_default();
        let range = row_range(&self.sheet_name, start_row, width);
        let row_count = rows.len();
        let request = self
            .http
            .post(self.values_url(&range, Some("append")))
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": rows,
            }));

        self.send(request).await?;
        info!(
            rows = row_count,
            start_row,
            sheet = %self.sheet_name,
            "appended rows to feed sheet"
        );

        Ok(())
    }

    async fn update_row(&self, row: u32, values: Vec<String>) -> FeedResult<()> {
        let range = row_range(&self.sheet_name, row, values.len());
        let request = self
            .http
            .put(self.values_url(&range, None))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [values],
            }));

        self.send(request).await?;
        debug!(row, sheet = %self.sheet_name, "updated feed sheet row");

        Ok(())
    }

    async fn delete_row(&self, row: u32) -> FeedResult<()> {
        if row < 2 {
            bail!(
                ErrorKind::InvalidData,
                "Refusing to delete the header row",
                format!("row {row}")
            );
        }

        let sheet_id = self.sheet_id().await?;
        let request = self
            .http
            .post(self.spreadsheet_action_url("batchUpdate"))
            .json(&json!({
                "requests": [{
                    "deleteDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "ROWS",
                            "startIndex": row - 1,
                            "endIndex": row,
                        }
                    }
                }]
            }));

        self.send(request).await?;
        debug!(row, sheet = %self.sheet_name, "deleted feed sheet row");

        Ok(())
    }
}

fn spreadsheet_url(base_url: &str, spreadsheet_id: &str) -> FeedResult<Url> {
    let mut url = Url::parse(base_url).map_err(|err| {
        feed_error!(
            ErrorKind::ConfigError,
            "Sheets API base URL is invalid",
            format!("{base_url}: {err}")
        )
    })?;

    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().push(spreadsheet_id);
        }
        Err(()) => bail!(
            ErrorKind::ConfigError,
            "Sheets API base URL cannot hold a path",
            base_url
        ),
    }

    Ok(url)
}

/// Quotes a sheet name for use in A1 notation, doubling embedded quotes.
pub fn quote_sheet_name(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

/// Returns the A1 column letters of the 1-based column `index`: 1 → `A`, 27 → `AA`.
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = index;

    while remaining > 0 {
        let offset = (remaining - 1) % 26;
        letters.push(b'A' + offset as u8);
        remaining = (remaining - 1) / 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 range covering the first `width` cells of sheet row `row`.
pub fn row_range(sheet_name: &str, row: u32, width: usize) -> String {
    let last_column = column_letters(width.max(1));
    format!("{}!A{row}:{last_column}{row}", quote_sheet_name(sheet_name))
}
