use marksheet_model::UnknownSemester;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    /// The visitor has no live sessions: never started, already submitted,
    /// or retired.
    #[error("session expired")]
    SessionExpired,

    #[error("session expired: {0}")]
    UnknownSemester(#[from] UnknownSemester),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid portal configuration: {0}")]
    InvalidConfig(String),
}

impl PortalError {
    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            source,
        }
    }

    /// Whether this error should be shown to the visitor as an expired
    /// session rather than an upstream failure.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::UnknownSemester(_))
    }
}
