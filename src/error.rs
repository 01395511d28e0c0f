//! Error taxonomy for catalog operations.
//!
//! Fetch-level failures ([`ArkhamError::Network`], [`ArkhamError::UpstreamStatus`],
//! [`ArkhamError::InvalidResponse`]) are normally recovered into empty results
//! by the cache and the card listing. Lookup failures ([`ArkhamError::NotFound`],
//! [`ArkhamError::InvalidUri`]) propagate to the HTTP / MCP boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArkhamError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned {status} for {url}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid uri: {0}")]
    InvalidUri(String),
}

impl ArkhamError {
    /// True for timeouts, connection failures and non-2xx upstream responses.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            ArkhamError::Network(_) | ArkhamError::UpstreamStatus { .. }
        )
    }
}

pub type ArkhamResult<T> = std::result::Result<T, ArkhamError>;
