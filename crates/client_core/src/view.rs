use shared::{
    domain::{format_amount, LastModified, Order, SummaryEntry},
    summary::grand_total,
};
use tracing::debug;

use crate::error::FetchError;

const ALERT_TITLE: &str = "Грешка";

/// A successful fetch, already normalized and aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct OrdersSnapshot {
    pub orders: Vec<Order>,
    pub summary: Vec<SummaryEntry>,
    pub last_modified: Option<LastModified>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// One orders table row, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub client: String,
    pub vendor: String,
    pub description: String,
    /// Discounted price when one is set.
    pub price: String,
    pub quantity: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub error: FetchError,
}

impl Alert {
    fn for_error(error: FetchError) -> Self {
        Self {
            title: ALERT_TITLE.into(),
            message: format!("Неуспешно зареждане на данните: {}", error.user_message()),
            error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// A newer request already completed; the outcome was dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct OrdersView {
    orders: Vec<Order>,
    summary: Vec<SummaryEntry>,
    last_modified: Option<LastModified>,
    loading: bool,
    refreshing: bool,
    alert: Option<Alert>,
    last_issued: u64,
    last_accepted: u64,
}

impl OrdersView {
    /// Starts in the loading state, before the first fetch is issued.
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn begin_initial_load(&mut self) -> RequestTicket {
        self.loading = true;
        self.issue()
    }

    pub fn begin_refresh(&mut self) -> RequestTicket {
        self.refreshing = true;
        self.issue()
    }

    fn issue(&mut self) -> RequestTicket {
        self.last_issued += 1;
        RequestTicket(self.last_issued)
    }

    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<OrdersSnapshot, FetchError>,
    ) -> Completion {
        if ticket.0 == self.last_issued {
            self.loading = false;
            self.refreshing = false;
        }
        if ticket.0 <= self.last_accepted {
            debug!(
                ticket = ticket.0,
                last_accepted = self.last_accepted,
                "dropping stale orders response"
            );
            return Completion::Stale;
        }
        self.last_accepted = ticket.0;

        match outcome {
            Ok(snapshot) => {
                self.orders = snapshot.orders;
                self.summary = snapshot.summary;
                if snapshot.last_modified.is_some() {
                    self.last_modified = snapshot.last_modified;
                }
                self.alert = None;
                Completion::Applied
            }
            Err(error) => {
                self.alert = Some(Alert::for_error(error));
                Completion::Failed
            }
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn summary(&self) -> &[SummaryEntry] {
        &self.summary
    }

    pub fn last_modified(&self) -> Option<&LastModified> {
        self.last_modified.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn grand_total(&self) -> f64 {
        grand_total(&self.summary)
    }

    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.orders
            .iter()
            .map(|order| OrderLine {
                client: order.client.clone(),
                vendor: order.vendor.clone(),
                description: order.description.clone(),
                price: format_amount(order.effective_price()),
                quantity: order.quantity.to_string(),
                total: format_amount(order.total),
            })
            .collect()
    }

    /// Summary rows as (client, amount) pairs ready for display.
    pub fn summary_lines(&self) -> Vec<(String, String)> {
        self.summary
            .iter()
            .map(|entry| (entry.client.clone(), format_amount(entry.total)))
            .collect()
    }

    pub fn formatted_grand_total(&self) -> String {
        format_amount(self.grand_total())
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
