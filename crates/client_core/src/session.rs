use std::sync::Arc;

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::{
    push::PushPlatform,
    view::{Completion, OrdersView, RequestTicket},
    LunchClient,
};

/// Client, view state and push delivery for one running app.
pub struct LunchSession {
    client: LunchClient,
    push: Arc<dyn PushPlatform>,
    view: Mutex<OrdersView>,
    updates: broadcast::Sender<Completion>,
}

impl LunchSession {
    pub fn new(client: LunchClient, push: Arc<dyn PushPlatform>) -> Arc<Self> {
        let (updates, _) = broadcast::channel(64);
        Arc::new(Self {
            client,
            push,
            view: Mutex::new(OrdersView::new()),
            updates,
        })
    }

    /// Fires after every completed load, stale ones included.
    pub fn subscribe_updates(&self) -> broadcast::Receiver<Completion> {
        self.updates.subscribe()
    }

    /// Initial load, then push registration in the background.
    pub async fn start(self: &Arc<Self>) -> Completion {
        let ticket = self.view.lock().await.begin_initial_load();
        let completion = self.load(ticket).await;

        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.register_push().await;
        });
        completion
    }

    pub async fn refresh(&self) -> Completion {
        let ticket = self.view.lock().await.begin_refresh();
        self.load(ticket).await
    }

    async fn load(&self, ticket: RequestTicket) -> Completion {
        let outcome = self.client.fetch_orders().await;
        let completion = self.view.lock().await.complete(ticket, outcome);
        let _ = self.updates.send(completion);
        completion
    }

    async fn register_push(&self) {
        match self.push.register_for_delivery().await {
            Ok(Some(token)) => self.client.register_push_token(&token).await,
            Ok(None) => info!("push delivery unavailable; skipping token registration"),
            Err(error) => warn!(%error, "push registration failed"),
        }
    }

    /// Reloads the orders whenever a push message arrives.
    pub fn spawn_push_refresh(self: &Arc<Self>) -> JoinHandle<()> {
        let session = Arc::clone(self);
        let mut messages = self.push.subscribe_messages();
        tokio::spawn(async move {
            loop {
                match messages.recv().await {
                    Ok(message) => {
                        info!(title = ?message.title, "push message received; refreshing orders");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "push messages lagged; refreshing orders");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                session.refresh().await;
            }
        })
    }

    pub async fn view(&self) -> OrdersView {
        self.view.lock().await.clone()
    }

    pub async fn dismiss_alert(&self) {
        self.view.lock().await.dismiss_alert();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
