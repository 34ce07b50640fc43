use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TelemetryError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("link error: {0}")]
    Link(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing analog input")]
    MissingAnalogIn,
    #[error("missing indicator")]
    MissingIndicator,
    #[error("missing uplink")]
    MissingUplink,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;

/// Map a boxed seam error into a typed core error. Timeouts keep their
/// identity so callers can distinguish a stalled sensor from a broken one.
pub(crate) fn map_hw_error(e: &(dyn std::error::Error + Send + Sync)) -> TelemetryError {
    let text = e.to_string();
    if text.to_lowercase().contains("timeout") {
        TelemetryError::Timeout
    } else {
        TelemetryError::Hardware(text)
    }
}
