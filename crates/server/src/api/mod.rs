use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use sheets_integration::{RowSource, SheetsError};
use shared::{
    domain::LastModified,
    error::{ApiError, ErrorCode},
    normalize::normalize_rows,
    protocol::{LastModifiedResponse, OrdersPayload},
    summary::summarize,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

struct CachedPayload {
    payload: OrdersPayload,
    fetched_at: Instant,
}

#[derive(Clone)]
pub struct ApiContext {
    pub source: Arc<dyn RowSource>,
    /// Zero disables caching.
    pub cache_ttl: Duration,
    cache: Arc<Mutex<Option<CachedPayload>>>,
}

impl ApiContext {
    pub fn new(source: Arc<dyn RowSource>, cache_ttl: Duration) -> Self {
        Self {
            source,
            cache_ttl,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    async fn cached_payload(&self) -> Option<OrdersPayload> {
        if self.cache_ttl.is_zero() {
            return None;
        }
        let guard = self.cache.lock().await;
        guard
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl)
            .map(|cached| cached.payload.clone())
    }

    async fn store_payload(&self, payload: &OrdersPayload) {
        if self.cache_ttl.is_zero() {
            return;
        }
        *self.cache.lock().await = Some(CachedPayload {
            payload: payload.clone(),
            fetched_at: Instant::now(),
        });
    }
}

/// Rows from the source, normalized and summarized. The modification time is
/// best effort: a failing lookup is logged and left out of the payload.
pub async fn load_orders(ctx: &ApiContext) -> Result<OrdersPayload, ApiError> {
    if let Some(payload) = ctx.cached_payload().await {
        return Ok(payload);
    }

    let rows = ctx.source.fetch_rows().await.map_err(source_error)?;
    let row_count = rows.len();
    let orders = normalize_rows(rows);
    let summary = summarize(&orders);

    let last_modified = match ctx.source.last_modified().await {
        Ok(modified) => modified.map(LastModified::Timestamp),
        Err(error) => {
            warn!(%error, "could not fetch spreadsheet modified time");
            None
        }
    };

    info!(
        rows = row_count,
        orders = orders.len(),
        clients = summary.len(),
        "orders loaded"
    );

    let payload = OrdersPayload {
        orders,
        summary,
        last_modified,
    };
    ctx.store_payload(&payload).await;
    Ok(payload)
}

pub async fn last_modified(ctx: &ApiContext) -> Result<LastModifiedResponse, ApiError> {
    let modified_time = ctx.source.last_modified().await.map_err(source_error)?;
    Ok(LastModifiedResponse { modified_time })
}

fn source_error(error: SheetsError) -> ApiError {
    warn!(%error, "row source request failed");
    match error {
        SheetsError::NotConfigured(_) => ApiError::new(ErrorCode::NotConfigured, error.to_string()),
        _ => ApiError::new(ErrorCode::Upstream, error.to_string()),
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
