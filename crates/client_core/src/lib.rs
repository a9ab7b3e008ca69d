use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;
use shared::{
    protocol::{InboundPayload, PushTokenRequest},
    summary::summarize,
};
use tracing::{debug, info, warn};
use url::Url;

pub mod error;
pub mod push;
pub mod session;
pub mod settings;
pub mod view;

pub use error::FetchError;
pub use push::{MissingPushPlatform, PushMessage, PushPlatform, PushToken};
pub use session::LunchSession;
pub use settings::ClientSettings;
pub use view::{Alert, Completion, OrderLine, OrdersSnapshot, OrdersView, RequestTicket};

/// HTTP access to the orders endpoint and the push registration endpoint.
pub struct LunchClient {
    http: Client,
    orders_url: Url,
    push_registration_url: Option<Url>,
}

impl LunchClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            orders_url: settings.orders_endpoint()?,
            push_registration_url: settings.push_endpoint()?,
        })
    }

    /// One GET, no retries. Every failure is reported as a [`FetchError`].
    pub async fn fetch_orders(&self) -> Result<OrdersSnapshot, FetchError> {
        let response = self
            .http
            .get(self.orders_url.clone())
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, url = %self.orders_url, "orders request failed");
                FetchError::from_transport(&err)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, url = %self.orders_url, "orders endpoint returned an error status");
            return Err(FetchError::ServerError(status));
        }

        let body = response.bytes().await.map_err(|err| {
            warn!(error = %err, "failed to read orders response body");
            FetchError::from_transport(&err)
        })?;
        let payload = decode_payload(&body)?;

        let orders = payload.orders();
        let summary = match payload.summary() {
            Some(summary) => summary,
            None => {
                debug!("payload carries no summary; aggregating locally");
                summarize(&orders)
            }
        };
        info!(
            orders = orders.len(),
            clients = summary.len(),
            "orders fetched"
        );
        Ok(OrdersSnapshot {
            orders,
            summary,
            last_modified: payload.last_modified(),
        })
    }

    /// Sends the device token to the registration endpoint. Failures are logged only.
    pub async fn register_push_token(&self, token: &PushToken) {
        let Some(url) = self.push_registration_url.as_ref() else {
            debug!("no push registration endpoint configured");
            return;
        };
        let body = match serde_json::to_string(&PushTokenRequest {
            token: token.0.clone(),
        }) {
            Ok(body) => body,
            Err(error) => {
                warn!(%error, "failed to encode push token");
                return;
            }
        };

        let result = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .and_then(|response| response.error_for_status());
        match result {
            Ok(_) => info!(%url, "push token registered"),
            Err(error) => warn!(%error, %url, "push token registration failed"),
        }
    }
}

fn decode_payload(body: &[u8]) -> Result<InboundPayload, FetchError> {
    let value: Value = serde_json::from_slice(body).map_err(|error| {
        warn!(%error, "orders response is not valid JSON");
        FetchError::MalformedPayload
    })?;
    if !value.is_object() {
        warn!("orders response is not a JSON object");
        return Err(FetchError::MalformedPayload);
    }
    serde_json::from_value(value).map_err(|error| {
        warn!(%error, "orders response has an unexpected shape");
        FetchError::MalformedPayload
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
