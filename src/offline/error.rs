use thiserror::Error;

/// Result type for the offline worker.
pub type Result<T> = std::result::Result<T, OfflineError>;

/// Failures inside the offline worker.
///
/// A missing cache entry is not an error: lookups return `None`.
#[derive(Debug, Error)]
pub enum OfflineError {
  #[error("network request for {url} failed: {reason}")]
  Network { url: String, reason: String },

  #[error("{url} answered with status {status}")]
  Status { url: String, status: u16 },

  #[error("cache generation {generation} is not installed")]
  NotInstalled { generation: String },

  #[error("cache storage error: {0}")]
  Storage(String),

  #[error("invalid request: {0}")]
  InvalidRequest(String),
}

impl OfflineError {
  pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
    Self::Network {
      url: url.into(),
      reason: reason.to_string(),
    }
  }

  pub fn storage(reason: impl ToString) -> Self {
    Self::Storage(reason.to_string())
  }
}

impl From<rusqlite::Error> for OfflineError {
  fn from(e: rusqlite::Error) -> Self {
    Self::storage(e)
  }
}

impl From<url::ParseError> for OfflineError {
  fn from(e: url::ParseError) -> Self {
    Self::InvalidRequest(e.to_string())
  }
}
