use thiserror::Error;

use reelestate_feed::FeedError;
use reelestate_shared::error::SubscriptionError;
use reelestate_upload::WizardError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("{0}")]
    Wizard(#[from] WizardError),

    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    #[error("Active subscription required to publish listings")]
    SubscriptionRequired,

    #[error("No account signed in")]
    NotSignedIn,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server responded {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for ClientError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClientError::LockPoisoned(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
