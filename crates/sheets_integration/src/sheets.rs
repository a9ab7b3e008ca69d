use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use shared::domain::RawRow;
use tracing::{debug, info};
use url::Url;

use crate::{auth::ServiceAccountAuth, RowSource, ServiceAccountKey, SheetsError};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Data starts on row 4 of the Orders sheet; rows 1-3 are headers.
pub const DEFAULT_ORDERS_RANGE: &str = "Orders!A4:I";

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.metadata.readonly",
];

/// Accepts a bare spreadsheet id or a full `.../spreadsheets/d/<id>/edit` URL.
pub fn resolve_spreadsheet_id(input: &str) -> Option<String> {
    let input = input.trim();
    let id = match input.split_once("/d/") {
        Some((_, rest)) => rest.split(['/', '?', '#']).next().unwrap_or_default(),
        None if input.contains('/') => return None,
        None => input,
    };
    (!id.is_empty()).then(|| id.to_string())
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub orders_range: String,
    pub sheets_api_base: String,
    pub drive_api_base: String,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            orders_range: DEFAULT_ORDERS_RANGE.to_string(),
            sheets_api_base: SHEETS_API_BASE.to_string(),
            drive_api_base: DRIVE_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<RawRow>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    #[serde(rename = "modifiedTime", default)]
    modified_time: Option<DateTime<Utc>>,
}

pub struct GoogleSheetsSource {
    http: Client,
    auth: ServiceAccountAuth,
    config: SheetsConfig,
}

impl GoogleSheetsSource {
    pub fn new(http: Client, key: ServiceAccountKey, config: SheetsConfig) -> Self {
        let scopes = SCOPES.iter().map(|s| s.to_string()).collect();
        Self {
            auth: ServiceAccountAuth::new(http.clone(), key, scopes),
            http,
            config,
        }
    }

    fn values_url(&self) -> Result<Url, SheetsError> {
        let mut url = parse_base(&self.config.sheets_api_base)?;
        url.path_segments_mut()
            .map_err(|_| invalid_base(&self.config.sheets_api_base))?
            .pop_if_empty()
            .extend(["spreadsheets", self.config.spreadsheet_id.as_str(), "values"])
            .push(&self.config.orders_range);
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE");
        Ok(url)
    }

    fn drive_file_url(&self) -> Result<Url, SheetsError> {
        let mut url = parse_base(&self.config.drive_api_base)?;
        url.path_segments_mut()
            .map_err(|_| invalid_base(&self.config.drive_api_base))?
            .pop_if_empty()
            .extend(["files", self.config.spreadsheet_id.as_str()]);
        url.query_pairs_mut().append_pair("fields", "modifiedTime");
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        url: Url,
    ) -> Result<T, SheetsError> {
        let token = self.auth.access_token().await?;
        debug!(endpoint, %url, "row source request");
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| SheetsError::Transport { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| SheetsError::Transport { endpoint, source })?;
        if !status.is_success() {
            return Err(SheetsError::UpstreamStatus {
                endpoint,
                status,
                body,
            });
        }
        serde_json::from_str(&body).map_err(|source| SheetsError::Decode { endpoint, source })
    }
}

#[async_trait]
impl RowSource for GoogleSheetsSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, SheetsError> {
        let range: ValueRange = self.get_json("sheets values", self.values_url()?).await?;
        info!(
            spreadsheet_id = %self.config.spreadsheet_id,
            range = %self.config.orders_range,
            rows = range.values.len(),
            "fetched order rows"
        );
        Ok(range.values)
    }

    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, SheetsError> {
        let file: DriveFile = self
            .get_json("drive files", self.drive_file_url()?)
            .await?;
        Ok(file.modified_time)
    }
}

fn parse_base(base: &str) -> Result<Url, SheetsError> {
    Url::parse(base).map_err(|_| invalid_base(base))
}

fn invalid_base(base: &str) -> SheetsError {
    SheetsError::NotConfigured(format!("invalid API base url '{base}'"))
}

#[cfg(test)]
#[path = "tests/sheets_tests.rs"]
mod tests;
