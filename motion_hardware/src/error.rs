use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("motion sensor unavailable")]
    SensorUnavailable,
    #[error("location subscription rejected: {0}")]
    SubscriptionRejected(String),
}

pub type Result<T> = std::result::Result<T, HwError>;
