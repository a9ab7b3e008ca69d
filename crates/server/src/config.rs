use std::{fs, sync::Arc};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use sheets_integration::{
    resolve_spreadsheet_id, GoogleSheetsSource, MissingRowSource, RowSource, ServiceAccountKey,
    SheetsConfig, DEFAULT_ORDERS_RANGE,
};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Settings {
    pub server_bind: String,
    /// Spreadsheet id or full spreadsheet URL.
    pub spreadsheet: Option<String>,
    pub orders_range: String,
    /// Path to the service-account JSON key; never embedded in the binary.
    pub credentials_path: Option<String>,
    pub cache_ttl_seconds: u64,
    pub upstream_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3001".into(),
            spreadsheet: None,
            orders_range: DEFAULT_ORDERS_RANGE.into(),
            credentials_path: None,
            cache_ttl_seconds: 0,
            upstream_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    spreadsheet: Option<String>,
    orders_range: Option<String>,
    credentials_path: Option<String>,
    cache_ttl_seconds: Option<u64>,
    upstream_timeout_seconds: Option<u64>,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then `server.toml`, then environment; later sources win.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.spreadsheet {
                    settings.spreadsheet = Some(v);
                }
                if let Some(v) = file_cfg.orders_range {
                    settings.orders_range = v;
                }
                if let Some(v) = file_cfg.credentials_path {
                    settings.credentials_path = Some(v);
                }
                if let Some(v) = file_cfg.cache_ttl_seconds {
                    settings.cache_ttl_seconds = v;
                }
                if let Some(v) = file_cfg.upstream_timeout_seconds {
                    settings.upstream_timeout_seconds = v;
                }
            }
            Err(error) => warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    if let Some(port) = env("PORT") {
        settings.server_bind = format!("0.0.0.0:{port}");
    }
    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("SPREADSHEET_URL") {
        settings.spreadsheet = Some(v);
    }
    if let Some(v) = env("APP__SPREADSHEET") {
        settings.spreadsheet = Some(v);
    }

    if let Some(v) = env("APP__ORDERS_RANGE") {
        settings.orders_range = v;
    }

    if let Some(v) = env("GOOGLE_APPLICATION_CREDENTIALS") {
        settings.credentials_path = Some(v);
    }
    if let Some(v) = env("APP__CREDENTIALS_PATH") {
        settings.credentials_path = Some(v);
    }

    if let Some(v) = env("APP__CACHE_TTL_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.cache_ttl_seconds = parsed;
        }
    }
    if let Some(v) = env("APP__UPSTREAM_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.upstream_timeout_seconds = parsed;
        }
    }

    settings
}

/// Google Sheets when both a spreadsheet and a key are configured, otherwise
/// a source that answers every request with "not configured".
pub fn build_row_source(
    settings: &Settings,
    http: reqwest::Client,
) -> anyhow::Result<Arc<dyn RowSource>> {
    let Some(spreadsheet) = settings
        .spreadsheet
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    else {
        warn!("no spreadsheet configured; set SPREADSHEET_URL or APP__SPREADSHEET");
        return Ok(Arc::new(MissingRowSource));
    };
    let spreadsheet_id = resolve_spreadsheet_id(spreadsheet)
        .ok_or_else(|| anyhow!("cannot find a spreadsheet id in '{spreadsheet}'"))?;

    let Some(credentials_path) = settings.credentials_path.as_deref() else {
        warn!("no service account key configured; set GOOGLE_APPLICATION_CREDENTIALS");
        return Ok(Arc::new(MissingRowSource));
    };
    let key = ServiceAccountKey::from_file(credentials_path)
        .with_context(|| format!("failed to load service account key '{credentials_path}'"))?;

    info!(
        %spreadsheet_id,
        range = %settings.orders_range,
        client_email = %key.client_email,
        "using google sheets row source"
    );
    let mut config = SheetsConfig::new(spreadsheet_id);
    config.orders_range = settings.orders_range.clone();
    Ok(Arc::new(GoogleSheetsSource::new(http, key, config)))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
