use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("failed to write header image to {}: {source}", path.display())]
    FileWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("incorrect admin password")]
    AuthenticationMismatch,

    #[error("failed to read header image from {}: {source}", path.display())]
    HeaderImageUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("header image upload rejected: {0}")]
    UploadRejected(String),

    #[error("header image upload exceeds the {limit}-byte limit")]
    UploadTooLarge { limit: usize },

    #[error("failed to serialize chart spec: {0}")]
    ChartSerialization(#[from] serde_json::Error),
}
