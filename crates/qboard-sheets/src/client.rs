//! Google Sheets v4 adapter for the row store.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use qboard_core::{
    Column, QuestionRecord, SheetRow, SheetStore, StoreError, SubmittedAt, WorksheetId, COLUMNS,
};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};

use crate::config::{read_token_file, SheetsConfig};
use crate::error::{SheetsError, BACKEND};
use crate::range::{append_range, data_range, row_from_span, row_range};

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct ValuesBody<'a> {
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: [Vec<&'a str>; 1],
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
}

// =============================================================================
// ADAPTER
// =============================================================================

/// Where the bearer token comes from.
#[derive(Debug, Clone)]
enum TokenSource {
    Fixed(String),
    /// Re-read before every request so a rotated token is picked up.
    File(PathBuf),
}

impl TokenSource {
    fn token(&self) -> Result<String, SheetsError> {
        match self {
            Self::Fixed(token) => Ok(token.clone()),
            Self::File(path) => read_token_file(path),
        }
    }
}

/// Row store backed by one Google spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetsStore {
    client: reqwest::Client,
    token: TokenSource,
    base_url: Url,
    spreadsheet_id: String,
    first_data_row: u32,
    timeout: Duration,
}

impl SheetsStore {
    /// Create from config, taking the token from the configured secret file.
    ///
    /// The file is read once here so a missing secret fails at startup, then
    /// again for every request.
    pub fn from_config(config: &SheetsConfig) -> Result<Self, SheetsError> {
        config.read_token()?;
        Self::build(config, TokenSource::File(config.token_file.clone()))
    }

    /// Create from config with a fixed bearer token.
    pub fn with_token(config: &SheetsConfig, token: impl Into<String>) -> Result<Self, SheetsError> {
        Self::build(config, TokenSource::Fixed(token.into()))
    }

    fn build(config: &SheetsConfig, token: TokenSource) -> Result<Self, SheetsError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SheetsError::config(format!("invalid base URL '{}': {e}", config.base_url)))?;

        if config.spreadsheet_id.trim().is_empty() {
            return Err(SheetsError::config("spreadsheet_id is empty"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| SheetsError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
            first_data_row: config.first_data_row(),
            timeout: config.timeout(),
        })
    }

    /// `{base}/v4/spreadsheets/{id}` plus extra path segments, each encoded.
    fn url(&self, extra: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SheetsError::config("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(extra);
        Ok(url)
    }

    fn map_send_error(&self, err: reqwest::Error) -> SheetsError {
        if err.is_timeout() {
            SheetsError::Timeout(self.timeout)
        } else {
            SheetsError::Http(err)
        }
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, SheetsError> {
        let token = self.token.token()?;
        let auth_value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SheetsError::config("Invalid access token format"))?;
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, auth_value))
    }

    /// Send and check the status.
    async fn send(&self, request: RequestBuilder) -> Result<Response, SheetsError> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        Self::check(response).await
    }

    /// Turn non-success responses into `SheetsError::Status`.
    async fn check(response: Response) -> Result<Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(SheetsError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, SheetsError> {
        self.send(self.request(Method::GET, url)?)
            .await?
            .json::<T>()
            .await
            .map_err(|e| SheetsError::Decode(e.to_string()))
    }

    /// Worksheet titles in the spreadsheet.
    pub async fn worksheet_titles(&self) -> Result<Vec<String>, SheetsError> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");

        let meta: SpreadsheetMeta = self.get_json(url).await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    /// Read rows of `worksheet` restricted to `columns`.
    pub async fn read_rows(
        &self,
        worksheet: &WorksheetId,
        columns: &[Column],
    ) -> Result<Vec<SheetRow>, SheetsError> {
        let Some(range) = data_range(worksheet, columns, self.first_data_row) else {
            return Ok(Vec::new());
        };

        let mut url = self.url(&["values", &range])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");

        let values: ValueRange = self.get_json(url).await?;

        Ok(values
            .values
            .iter()
            .map(|cells| {
                let cells: Vec<String> = cells.iter().map(cell_to_string).collect();
                row_from_span(&cells, columns)
            })
            .collect())
    }

    /// Make sure row 1 is a header when data starts below it.
    ///
    /// An empty row 1 gets `group | text | submitted_at` written into it,
    /// otherwise the first append would land there and never be read back.
    /// A row 1 whose timestamp cell parses holds a question, not a header.
    /// Any other content is accepted as a header.
    pub async fn ensure_header(&self, worksheet: &WorksheetId) -> Result<(), SheetsError> {
        if self.first_data_row <= 1 {
            return Ok(());
        }
        let range = row_range(worksheet, &COLUMNS, 1)
            .ok_or_else(|| SheetsError::config("empty column layout"))?;

        let values: ValueRange = self.get_json(self.url(&["values", &range])?).await?;
        let cells: Vec<String> = values
            .values
            .first()
            .map(|row| row.iter().map(cell_to_string).collect())
            .unwrap_or_default();
        let row = row_from_span(&cells, &COLUMNS);

        if row.is_blank() {
            self.write_header(&range).await?;
            tracing::info!(%worksheet, "Wrote header row");
            return Ok(());
        }

        if let Some(ts) = row.cell(Column::SubmittedAt) {
            if SubmittedAt::parse(ts).is_ok() {
                return Err(SheetsError::HeaderMismatch(format!(
                    "row 1 of '{worksheet}' holds a question submitted at {}; insert a header row above it",
                    ts.trim()
                )));
            }
        }
        Ok(())
    }

    async fn write_header(&self, range: &str) -> Result<(), SheetsError> {
        let mut url = self.url(&["values", range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = ValuesBody {
            major_dimension: "ROWS",
            values: [COLUMNS.iter().map(|c| c.header()).collect()],
        };

        self.send(self.request(Method::PUT, url)?.json(&body)).await?;
        Ok(())
    }

    /// Append one record below the last data row.
    pub async fn append_record(
        &self,
        worksheet: &WorksheetId,
        record: &QuestionRecord,
    ) -> Result<(), SheetsError> {
        let range = append_range(worksheet, &COLUMNS)
            .ok_or_else(|| SheetsError::config("empty column layout"))?;

        let mut url = self.url(&["values", &format!("{range}:append")])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let submitted_at = record.submitted_at.to_string();
        let body = ValuesBody {
            major_dimension: "ROWS",
            values: [vec![
                record.group.as_str(),
                record.text.as_str(),
                submitted_at.as_str(),
            ]],
        };

        self.send(self.request(Method::POST, url)?.json(&body)).await?;
        Ok(())
    }
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for SheetsStore {
    fn backend_tag(&self) -> &'static str {
        BACKEND
    }

    async fn probe(&self, worksheet: &WorksheetId) -> Result<(), StoreError> {
        let titles = self.worksheet_titles().await?;
        if !titles.iter().any(|t| t == worksheet.as_str()) {
            return Err(SheetsError::WorksheetNotFound(worksheet.clone()).into());
        }
        tracing::debug!(%worksheet, "Worksheet found");
        self.ensure_header(worksheet).await?;
        Ok(())
    }

    async fn append(&self, worksheet: &WorksheetId, record: &QuestionRecord) -> Result<(), StoreError> {
        self.append_record(worksheet, record).await.map_err(|e| {
            tracing::debug!(code = e.code(), "Sheets append failed");
            e.into()
        })
    }

    async fn read_all(
        &self,
        worksheet: &WorksheetId,
        columns: &[Column],
    ) -> Result<Vec<SheetRow>, StoreError> {
        self.read_rows(worksheet, columns).await.map_err(|e| {
            tracing::debug!(code = e.code(), "Sheets read failed");
            e.into()
        })
    }
}
