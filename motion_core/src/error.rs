use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum MotionError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("motion detector error: {0}")]
    Detector(String),
    #[error("location provider error: {0}")]
    Location(String),
    #[error("scenario error: {0}")]
    Scenario(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor platform")]
    MissingPlatform,
    #[error("missing location provider")]
    MissingLocationProvider,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
