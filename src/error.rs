use thiserror::Error;

/// Errors surfaced by the button orchestration layer.
///
/// The type is `Clone` because a single outcome is fanned out to every caller
/// awaiting a shared payment-token or meta-bridge future.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ButtonError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Can not render button in IE intranet mode")]
    IeIntranet,
    #[error("Opening meta window without bridge support is not currently supported")]
    BridgeUnsupported,
    #[error("Timed out waiting {0}ms for payment")]
    Timeout(u64),
    #[error("No value passed to payment")]
    MissingToken,
    #[error("{0}")]
    Callback(String),
    #[error("Bridge error: {0}")]
    Bridge(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("JSON error: {0}")]
    Json(String),
}

impl ButtonError {
    /// Wraps a merchant-side failure message.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::Callback(message.into())
    }
}

impl From<std::io::Error> for ButtonError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for ButtonError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for ButtonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ButtonError>;
