use thiserror::Error;

/// Failure kinds for remote store calls and the snapshot artifact.
///
/// Callers in the page-facing paths catch these at the call site, log them,
/// and degrade (empty collection, keep last optimistic state) instead of
/// propagating.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote read failed: {0}")]
    Fetch(String),
    #[error("remote write failed: {0}")]
    Write(String),
    #[error("snapshot unavailable: {0}")]
    Snapshot(String),
}

impl StoreError {
    pub fn fetch(message: impl std::fmt::Display) -> Self {
        Self::Fetch(message.to_string())
    }

    pub fn write(message: impl std::fmt::Display) -> Self {
        Self::Write(message.to_string())
    }

    pub fn snapshot(message: impl std::fmt::Display) -> Self {
        Self::Snapshot(message.to_string())
    }
}
