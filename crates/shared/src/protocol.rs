use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{Cell, LastModified, Order, SummaryEntry, TOTAL_ROW_SENTINEL},
    normalize::{cell_number, normalize_values},
    summary::merge_entries,
};

pub const ORDERS_ROUTE: &str = "/api/orders";
pub const LAST_MODIFIED_ROUTE: &str = "/api/last-modified";
pub const HEALTH_ROUTE: &str = "/api/health";

/// Body served by the orders proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdersPayload {
    pub orders: Vec<Order>,
    pub summary: Vec<SummaryEntry>,
    #[serde(
        rename = "lastModified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<LastModified>,
}

/// Fetch payload as any row source may send it: the proxy, or an Apps Script
/// deployment returning raw rows. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundPayload {
    #[serde(default)]
    pub orders: Option<Vec<Value>>,
    #[serde(default)]
    pub summary: Option<Vec<Value>>,
    #[serde(rename = "lastModified", default)]
    pub last_modified: Option<Value>,
    #[serde(rename = "modifiedTime", default)]
    pub modified_time: Option<Value>,
}

impl InboundPayload {
    pub fn orders(&self) -> Vec<Order> {
        self.orders
            .as_deref()
            .map(normalize_values)
            .unwrap_or_default()
    }

    /// Pre-aggregated summary, if the source sent one. Repeated clients are
    /// merged and the result is put in collation order.
    pub fn summary(&self) -> Option<Vec<SummaryEntry>> {
        self.summary.as_deref().map(|entries| {
            let parsed: Vec<SummaryEntry> = entries.iter().filter_map(summary_entry).collect();
            merge_entries(&parsed)
        })
    }

    pub fn last_modified(&self) -> Option<LastModified> {
        [&self.last_modified, &self.modified_time]
            .into_iter()
            .flatten()
            .find_map(|value| match value {
                Value::String(text) if !text.trim().is_empty() => {
                    serde_json::from_value(value.clone()).ok()
                }
                _ => None,
            })
    }
}

fn summary_entry(value: &Value) -> Option<SummaryEntry> {
    let record = value.as_object()?;
    let client = ["Client", "clientName", "client"]
        .iter()
        .find_map(|key| record.get(*key))
        .map(|v| Cell::from(v).text().trim().to_string())
        .unwrap_or_default();
    if client.is_empty() || client == TOTAL_ROW_SENTINEL {
        return None;
    }
    let total = record
        .get("total")
        .map(|v| cell_number(&Cell::from(v)))
        .unwrap_or(0.0);
    Some(SummaryEntry { client, total })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastModifiedResponse {
    #[serde(rename = "modifiedTime")]
    pub modified_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushTokenRequest {
    pub token: String,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
