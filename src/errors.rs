use thiserror::Error;

/// Failures while talking to an exchange. Always caught at the adapter
/// boundary and degraded to "no data for this exchange"; never fatal to the
/// fetch cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("unexpected payload shape: {0}")]
    Parse(String),
}

/// Failures reading or writing the snapshot artifact. Surfaced typed so the
/// presentation side can show an explicit "data unavailable" state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no snapshot has been written yet")]
    NotFound,

    #[error("snapshot artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
}
