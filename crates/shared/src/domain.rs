use std::{borrow::Cow, fmt};

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Client name the spreadsheet uses for its own grand-total row.
pub const TOTAL_ROW_SENTINEL: &str = "total";

/// One spreadsheet cell as delivered by a row source.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Cell {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Empty => Cow::Borrowed(""),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Empty => true,
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or_default(),
            Value::String(s) => Cell::Text(s.clone()),
            Value::Bool(b) => Cell::Text(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Cell::Empty,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

// Sheets and Apps Script mix numbers, strings, booleans and nulls freely, so a
// cell never fails to deserialize.
impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Cell::from(&value))
    }
}

/// Positional row: client, vendor, description, price, discounted price,
/// quantity, total.
pub type RawRow = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "Client")]
    pub client: String,
    #[serde(rename = "restorant")]
    pub vendor: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub price: f64,
    #[serde(rename = "disc_price")]
    pub discounted_price: f64,
    #[serde(rename = "quant")]
    pub quantity: f64,
    pub total: f64,
}

impl Order {
    /// Price shown in the orders table: the discounted price when one is set.
    pub fn effective_price(&self) -> f64 {
        if self.discounted_price != 0.0 {
            self.discounted_price
        } else {
            self.price
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    #[serde(rename = "Client")]
    pub client: String,
    pub total: f64,
}

/// Spreadsheet modification time. Apps Script deployments may send a
/// preformatted locale string instead of an ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LastModified {
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl LastModified {
    pub const DISPLAY_FORMAT: &'static str = "%d.%m.%Y | %H:%M";

    pub fn display_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            LastModified::Timestamp(ts) => ts
                .with_timezone(tz)
                .format(Self::DISPLAY_FORMAT)
                .to_string(),
            LastModified::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for LastModified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_in(&Local))
    }
}

/// Amounts are kept unrounded and only fixed to two decimals for display.
pub fn format_amount(value: f64) -> String {
    // avoid rendering "-0.00"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.2}")
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
