//! Raw spreadsheet rows to typed [`Order`]s.
//!
//! Nothing in here fails: bad rows are dropped and bad numbers become zero.

use serde_json::{Map, Value};

use crate::domain::{Cell, Order, RawRow, TOTAL_ROW_SENTINEL};

const COL_CLIENT: usize = 0;
const COL_VENDOR: usize = 1;
const COL_DESCRIPTION: usize = 2;
const COL_PRICE: usize = 3;
const COL_DISCOUNTED_PRICE: usize = 4;
const COL_QUANTITY: usize = 5;
const COL_TOTAL: usize = 6;

/// Record keys accepted per column, in lookup order.
const RECORD_KEYS: [&[&str]; 7] = [
    &["Client", "clientName", "client"],
    &["restorant", "vendor", "restaurant"],
    &["desc", "description"],
    &["price"],
    &["disc_price", "discountedPrice", "discounted_price"],
    &["quant", "quantity"],
    &["total"],
];

pub fn normalize_rows<I>(rows: I) -> Vec<Order>
where
    I: IntoIterator<Item = RawRow>,
{
    rows.into_iter()
        .filter_map(|row| normalize_row(&row))
        .collect()
}

/// Normalizes the `orders` array of a fetch payload. Elements may be
/// positional rows or keyed records; anything else is skipped.
pub fn normalize_values(values: &[Value]) -> Vec<Order> {
    normalize_rows(values.iter().filter_map(value_to_row))
}

pub fn normalize_row(row: &[Cell]) -> Option<Order> {
    let first = row.first()?;
    if first.is_blank() {
        return None;
    }

    let order = Order {
        client: text_at(row, COL_CLIENT),
        vendor: text_at(row, COL_VENDOR),
        description: text_at(row, COL_DESCRIPTION),
        price: number_at(row, COL_PRICE),
        discounted_price: number_at(row, COL_DISCOUNTED_PRICE),
        quantity: number_at(row, COL_QUANTITY),
        total: number_at(row, COL_TOTAL),
    };

    if order.client.is_empty() || order.client == TOTAL_ROW_SENTINEL {
        return None;
    }
    Some(order)
}

/// Number cells pass through; text goes through [`parse_or_zero`].
pub fn cell_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) | Cell::Empty => 0.0,
        Cell::Text(text) => parse_or_zero(text),
    }
}

/// Parses the longest leading decimal literal of `text`, like JavaScript's
/// `parseFloat`. Returns 0 when there is none or the result is not finite.
pub fn parse_or_zero(text: &str) -> f64 {
    let text = text.trim_start();
    let literal = &text[..numeric_prefix_len(text)];
    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    end
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn text_at(row: &[Cell], index: usize) -> String {
    row.get(index)
        .map(|cell| cell.text().trim().to_string())
        .unwrap_or_default()
}

fn number_at(row: &[Cell], index: usize) -> f64 {
    row.get(index).map(cell_number).unwrap_or(0.0)
}

fn value_to_row(value: &Value) -> Option<RawRow> {
    match value {
        Value::Array(cells) => Some(cells.iter().map(Cell::from).collect()),
        Value::Object(record) => Some(record_to_row(record)),
        _ => None,
    }
}

fn record_to_row(record: &Map<String, Value>) -> RawRow {
    RECORD_KEYS
        .iter()
        .map(|keys| {
            keys.iter()
                .find_map(|key| record.get(*key))
                .map(Cell::from)
                .unwrap_or_default()
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
