use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid timecode: {0}")]
    Timecode(String),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Subscription token has expired")]
    Expired,

    #[error("Subscription token signature is invalid")]
    InvalidSignature,

    #[error("Billing server key is invalid")]
    InvalidServerKey,

    #[error("Token belongs to another account")]
    AccountMismatch,
}
