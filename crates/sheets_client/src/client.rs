//! Sheets v4 REST client.
//!
//! Blocking reqwest client (no Tokio runtime required), one HTTP request per
//! trait call. Retries are the caller's job.

use std::time::Duration;

use reqwest::blocking::{RequestBuilder, Response};
use reqwest::Url;
use serde_json::{json, Value};
use sheetshape_core::{Grid, Header, RemoteError, RemoteSheets, SheetKey, SourceId};

use crate::auth::AuthCredentials;
use crate::locator::spreadsheet_id_from_url;
use crate::range::{anchor, data_range, header_range};

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Connection options not carried by the credentials.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_base: String,
    /// Reads and clears cover columns A..=last_column
    pub last_column: String,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            last_column: "Z".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Google Sheets API client (blocking).
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    api_base: Url,
    token: String,
    last_column: String,
}

impl SheetsClient {
    /// `creds.api_base`, when present, overrides `options.api_base`.
    pub fn new(creds: AuthCredentials, options: ClientOptions) -> Result<Self, RemoteError> {
        let base = creds.api_base.as_deref().unwrap_or(&options.api_base);
        let api_base = Url::parse(base)
            .map_err(|e| RemoteError::transport(format!("invalid api base '{}': {}", base, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(RemoteError::transport(format!("api base '{}' cannot hold a path", base)));
        }

        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("sheetshape/{}", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .build()
            .map_err(|e| RemoteError::transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base,
            token: creds.token,
            last_column: options.last_column,
        })
    }

    /// `{base}/v4/spreadsheets/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["v4", "spreadsheets"]).extend(segments);
        }
        url
    }

    fn values_url(&self, source: &SourceId, range: &str) -> Url {
        self.url(&[source.as_str(), "values", range])
    }

    /// Numeric sheet ids and titles, in tab order.
    /// GET /v4/spreadsheets/{id}?fields=sheets.properties(sheetId,title)
    fn sheet_properties(&self, source: &SourceId) -> Result<Vec<(i64, String)>, RemoteError> {
        let request = self
            .http
            .get(self.url(&[source.as_str()]))
            .query(&[("fields", "sheets.properties(sheetId,title)")]);
        let json = self.send("get spreadsheet", request)?;

        let sheets = json["sheets"]
            .as_array()
            .map(|sheets| {
                sheets
                    .iter()
                    .filter_map(|s| {
                        let props = &s["properties"];
                        Some((props["sheetId"].as_i64()?, props["title"].as_str()?.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(sheets)
    }

    /// GET /v4/spreadsheets/{id}/values/{range}
    fn get_values(&self, source: &SourceId, range: &str) -> Result<Grid, RemoteError> {
        let request = self.http.get(self.values_url(source, range));
        let json = self.send("read values", request)?;
        Ok(parse_values(&json))
    }

    fn send(&self, label: &str, request: RequestBuilder) -> Result<Value, RemoteError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| RemoteError::transport(format!("{}: {}", label, e)))?;
        read_json(label, response)
    }
}

impl RemoteSheets for SheetsClient {
    fn resolve_locator(&self, locator: &str) -> Option<SourceId> {
        spreadsheet_id_from_url(locator)
    }

    fn list_sheets(&self, source: &SourceId) -> Result<Vec<String>, RemoteError> {
        let titles: Vec<String> = self
            .sheet_properties(source)?
            .into_iter()
            .map(|(_, title)| title)
            .collect();
        log::debug!("{} has {} sheets", source, titles.len());
        Ok(titles)
    }

    fn get_header(&self, key: &SheetKey) -> Result<Header, RemoteError> {
        let grid = self.get_values(&key.source, &header_range(&key.sheet))?;
        Ok(grid.into_iter().next().unwrap_or_default())
    }

    fn get_grid(&self, key: &SheetKey) -> Result<Grid, RemoteError> {
        self.get_values(&key.source, &data_range(&key.sheet, &self.last_column))
    }

    /// PUT /v4/spreadsheets/{id}/values/{'sheet'!A1}?valueInputOption=RAW
    fn write_grid(&self, key: &SheetKey, grid: &Grid) -> Result<(), RemoteError> {
        let request = self
            .http
            .put(self.values_url(&key.source, &anchor(&key.sheet)))
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": grid }));
        self.send("write values", request)?;
        log::debug!("wrote {} rows to {}", grid.len(), key);
        Ok(())
    }

    /// POST /v4/spreadsheets/{id}/values/{range}:clear
    fn clear_range(&self, key: &SheetKey) -> Result<(), RemoteError> {
        let range = format!("{}:clear", data_range(&key.sheet, &self.last_column));
        let request = self
            .http
            .post(self.values_url(&key.source, &range))
            .json(&json!({}));
        self.send("clear values", request)?;
        Ok(())
    }

    /// POST /v4/spreadsheets/{id}:batchUpdate with one deleteDimension per index.
    fn batch_delete_columns(&self, key: &SheetKey, indices: &[usize]) -> Result<(), RemoteError> {
        if indices.is_empty() {
            return Ok(());
        }

        let sheet_id = self
            .sheet_properties(&key.source)?
            .into_iter()
            .find(|(_, title)| *title == key.sheet)
            .map(|(id, _)| id)
            .ok_or_else(|| {
                RemoteError::status(404, format!("sheet '{}' not found in {}", key.sheet, key.source))
            })?;

        let requests: Vec<Value> = indices
            .iter()
            .map(|&index| {
                json!({
                    "deleteDimension": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "COLUMNS",
                            "startIndex": index,
                            "endIndex": index + 1,
                        }
                    }
                })
            })
            .collect();

        let batch_update = format!("{}:batchUpdate", key.source.as_str());
        let request = self
            .http
            .post(self.url(&[batch_update.as_str()]))
            .json(&json!({ "requests": requests }));
        self.send("batch update", request)?;
        log::debug!("deleted {} columns from {}", indices.len(), key);
        Ok(())
    }
}

/// Prefix of the 400 the API answers when a range names a sheet that does
/// not exist.
const UNPARSABLE_RANGE: &str = "Unable to parse range";

/// Non-2xx becomes a status error carrying `error.message`; an empty 2xx
/// body reads as `null`. A range naming a missing sheet is reported as 404.
fn read_json(label: &str, response: Response) -> Result<Value, RemoteError> {
    let status = response.status();
    let text = response
        .text()
        .map_err(|e| RemoteError::transport(format!("{}: failed to read body: {}", label, e)))?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body["error"]["message"].as_str().map(String::from))
            .unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("request failed").to_string()
            });
        if status.as_u16() == 400 && message.starts_with(UNPARSABLE_RANGE) {
            return Err(RemoteError::status(404, format!("Sheet not found: {}", message)));
        }
        return Err(RemoteError::status(status.as_u16(), message));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text)
        .map_err(|e| RemoteError::transport(format!("{}: invalid JSON response: {}", label, e)))
}

/// `values` rows as strings. Ragged rows stay ragged; non-string cells are
/// rendered with their JSON text.
fn parse_values(json: &Value) -> Grid {
    json["values"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_text).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
