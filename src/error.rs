use thiserror::Error;

/// Failure taxonomy for one scan attempt.
///
/// `InvalidUrl` is reported inline and never reaches the wire. `Transport`,
/// `Status`, and `Decode` surface to the user and fully reset the UI.
/// Channel-establishment failures are not represented here at all: the scan
/// degrades to a static indicator and proceeds.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server rejected scan (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    #[error("malformed scan response: {0}")]
    Decode(#[source] serde_json::Error),

    /// A newer scan cancelled this one before it settled.
    #[error("scan superseded by a newer scan")]
    Superseded,
}
