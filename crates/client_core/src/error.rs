use reqwest::StatusCode;
use thiserror::Error;

/// Every way a fetch can fail, as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("no response from the orders endpoint")]
    NetworkUnreachable,
    #[error("orders request timed out")]
    Timeout,
    #[error("orders endpoint answered with HTTP {0}")]
    ServerError(StatusCode),
    #[error("orders endpoint returned an unreadable payload")]
    MalformedPayload,
}

impl FetchError {
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::ServerError(status)
        } else {
            Self::NetworkUnreachable
        }
    }

    /// Localized text shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkUnreachable => "Няма интернет връзка. Проверете мрежата.".into(),
            Self::Timeout => "Сървърът не отговори навреме. Опитайте отново.".into(),
            Self::ServerError(status) => format!("Грешка от сървъра: {}", status.as_u16()),
            Self::MalformedPayload => "Получен е невалиден отговор от сървъра.".into(),
        }
    }
}
