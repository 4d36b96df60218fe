use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Empty or failed market-data fetch.
    #[error("Market data unavailable: {0}")]
    DataUnavailable(String),

    /// Price history shorter than the strategy's minimum window.
    #[error("Insufficient history: need {required} candles, have {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    /// Credential-gated operation attempted without valid credentials.
    #[error("API credentials required for this operation")]
    AuthenticationRequired,

    /// Order submission rejected or errored.
    #[error("Order execution failed: {0}")]
    ExecutionFailure(String),

    /// No settings, strategy, or pair configured.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Exchange API error: {0}")]
    Exchange(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for the error classes the scheduler recovers at the tick
    /// boundary: log, skip the (pair, strategy), continue the loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DataUnavailable(_)
                | Error::InsufficientHistory { .. }
                | Error::AuthenticationRequired
                | Error::ExecutionFailure(_)
                | Error::ConfigurationMissing(_)
                | Error::Exchange(_)
                | Error::Http(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
