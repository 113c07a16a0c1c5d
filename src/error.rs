use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors surfaced to the caller of `/api/assist`.
///
/// Crawl problems never show up here; they degrade into fewer snippets.
#[derive(Debug, thiserror::Error)]
pub enum AssistError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing {0} in environment")]
    MissingCredential(&'static str),

    #[error("Upstream error: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl AssistError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AssistError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AssistError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AssistError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AssistError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AssistError {
    fn into_response(self) -> Response {
        match &self {
            AssistError::Internal(e) => log::error!("assist failed: {:#}", e),
            AssistError::Upstream { status, .. } => {
                log::warn!("model service returned status {status}")
            }
            _ => log::debug!("rejecting request: {self}"),
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

/// Why a single URL did not become a document during a crawl.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("invalid url")]
    InvalidUrl,

    #[error("host not on allow-list")]
    DisallowedHost,

    #[error("timed out")]
    Timeout,

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("status {0}")]
    Status(u16),

    #[error("unparseable page: {0}")]
    Parse(String),

    #[error("text too short ({0} chars)")]
    TooShort(usize),
}
