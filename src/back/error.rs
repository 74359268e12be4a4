//! Error types for the market data backend.
//!
//! Every failure is caught by the poller, logged and turned into a skipped
//! cycle, so callers only need one error type to propagate with `?`.
use thiserror::Error;

/// Unified error type of the fetch layer.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure, non-2xx status, timeout or JSON decode error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL could not be parsed.
    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    /// The base URL parses but cannot take path segments (e.g. `mailto:`).
    #[error("Base URL cannot carry an API path: {0}")]
    CannotBeABase(String),

    /// A request worker thread panicked before delivering its result.
    #[error("Fetch worker for {0} panicked")]
    Worker(&'static str),
}

/// `Result` alias with `FetchError` as the default error.
pub type Result<T, E = FetchError> = std::result::Result<T, E>;
