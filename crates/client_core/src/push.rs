use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushToken(pub String);

/// A delivered notification. Any message means "the orders changed".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushMessage {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Device push delivery as provided by the host platform.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Asks for delivery permission and returns the device token, if granted.
    async fn register_for_delivery(&self) -> Result<Option<PushToken>>;
    fn subscribe_messages(&self) -> broadcast::Receiver<PushMessage>;
}

/// Used where the platform has no push delivery.
pub struct MissingPushPlatform {
    messages: broadcast::Sender<PushMessage>,
}

impl MissingPushPlatform {
    pub fn new() -> Self {
        let (messages, _) = broadcast::channel(1);
        Self { messages }
    }
}

impl Default for MissingPushPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushPlatform for MissingPushPlatform {
    async fn register_for_delivery(&self) -> Result<Option<PushToken>> {
        Ok(None)
    }

    fn subscribe_messages(&self) -> broadcast::Receiver<PushMessage> {
        self.messages.subscribe()
    }
}
