use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::domain::RawRow;
use thiserror::Error;

pub mod auth;
mod sheets;

pub use auth::{ServiceAccountAuth, ServiceAccountKey};
pub use sheets::{
    resolve_spreadsheet_id, GoogleSheetsSource, SheetsConfig, DEFAULT_ORDERS_RANGE,
    DRIVE_API_BASE, SHEETS_API_BASE,
};

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("row source is not configured: {0}")]
    NotConfigured(String),
    #[error("failed to read service account key '{path}': {source}")]
    CredentialsIo {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid service account key: {0}")]
    InvalidCredentials(String),
    #[error("failed to sign token grant: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}: {body}")]
    UpstreamStatus {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        source: serde_json::Error,
    },
}

/// System of record for raw order rows.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Data rows only; header rows are already skipped.
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, SheetsError>;
    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, SheetsError>;
}

/// Stands in when no spreadsheet is configured.
pub struct MissingRowSource;

#[async_trait]
impl RowSource for MissingRowSource {
    async fn fetch_rows(&self) -> Result<Vec<RawRow>, SheetsError> {
        Err(SheetsError::NotConfigured(
            "no spreadsheet id or credentials configured".into(),
        ))
    }

    async fn last_modified(&self) -> Result<Option<DateTime<Utc>>, SheetsError> {
        Err(SheetsError::NotConfigured(
            "no spreadsheet id or credentials configured".into(),
        ))
    }
}
