use anyhow::{bail, Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use url::Url;

const SETTINGS_FILE: &str = "lunch";
const ENV_PREFIX: &str = "LUNCH";
const DEFAULT_REQUEST_TIMEOUT_MS: i64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Where orders are fetched from: the proxy's `/api/orders` or a script URL.
    pub orders_url: String,
    #[serde(default)]
    pub push_registration_url: Option<String>,
    pub request_timeout_ms: u64,
}

impl ClientSettings {
    /// Optional `lunch.{toml,json,...}` in the working directory, then `LUNCH__*` env vars.
    pub fn load() -> Result<Self> {
        Self::build(
            Config::builder().add_source(File::with_name(SETTINGS_FILE).required(false)),
            ENV_PREFIX,
        )
    }

    pub fn from_toml(contents: &str, env_prefix: &str) -> Result<Self> {
        Self::build(
            Config::builder().add_source(File::from_str(contents, FileFormat::Toml)),
            env_prefix,
        )
    }

    fn build(builder: ConfigBuilder<DefaultState>, env_prefix: &str) -> Result<Self> {
        let settings: Self = builder
            .add_source(Environment::with_prefix(env_prefix).separator("__"))
            .set_default("request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS)?
            .build()
            .context("failed to read client settings")?
            .try_deserialize()
            .context("invalid client settings")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        self.orders_endpoint()?;
        self.push_endpoint()?;
        if self.request_timeout_ms == 0 {
            bail!("request_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn orders_endpoint(&self) -> Result<Url> {
        parse_http_url(&self.orders_url)
            .with_context(|| format!("invalid orders_url '{}'", self.orders_url))
    }

    pub fn push_endpoint(&self) -> Result<Option<Url>> {
        match self.push_registration_url.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => parse_http_url(raw)
                .map(Some)
                .with_context(|| format!("invalid push_registration_url '{raw}'")),
        }
    }
}

fn parse_http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported scheme '{other}'"),
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
