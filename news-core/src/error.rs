use thiserror::Error;

/// Failure of one feed page fetch. The `Display` form of each variant is
/// the message surfaced to the user through [`crate::Loadable::Failed`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No internet connection")]
    Offline,
    #[error("Network failure")]
    Transport(#[source] reqwest::Error),
    #[error("Conversion Error")]
    Decode(#[source] serde_json::Error),
    /// Non-success status; the server-supplied message is carried verbatim.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Empty Response Body")]
    EmptyBody,
}

/// Bookmark persistence failure. Store writes are expected to succeed in
/// normal operation; when they don't, callers get the error, not silence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bookmark store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bookmark store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("HTTP client build error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not locate a configuration directory")]
    NoConfigDir,
}
