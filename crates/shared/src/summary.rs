use std::collections::HashMap;

use crate::{
    collation,
    domain::{Order, SummaryEntry},
};

/// Per-client spend, sorted by Bulgarian collation of the client name.
///
/// Each client's totals are summed in ascending order, so the result does not
/// depend on the order of `orders`.
pub fn summarize(orders: &[Order]) -> Vec<SummaryEntry> {
    group_totals(
        orders
            .iter()
            .map(|order| (order.client.as_str(), order.total)),
    )
}

/// Brings a summary received from elsewhere into the same shape as
/// [`summarize`]: one entry per client, collation order.
pub fn merge_entries(entries: &[SummaryEntry]) -> Vec<SummaryEntry> {
    group_totals(
        entries
            .iter()
            .map(|entry| (entry.client.as_str(), entry.total)),
    )
}

fn group_totals<'a>(totals: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<SummaryEntry> {
    let mut by_client: HashMap<&str, Vec<f64>> = HashMap::new();
    for (client, total) in totals {
        by_client.entry(client).or_default().push(total);
    }

    let mut entries: Vec<SummaryEntry> = by_client
        .into_iter()
        .map(|(client, mut totals)| {
            totals.sort_by(f64::total_cmp);
            SummaryEntry {
                client: client.to_string(),
                total: totals.iter().sum(),
            }
        })
        .collect();

    entries.sort_by(|a, b| collation::compare(&a.client, &b.client));
    entries
}

pub fn grand_total(entries: &[SummaryEntry]) -> f64 {
    entries.iter().map(|entry| entry.total).sum()
}

#[cfg(test)]
#[path = "tests/summary_tests.rs"]
mod tests;
