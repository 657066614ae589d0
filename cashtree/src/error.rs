use thiserror::Error;

#[derive(Error, Debug)]
pub enum CashtreeError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("network error or server is unreachable")]
    Unreachable,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("malformed tree payload: {0}")]
    MalformedTree(String),
}

impl CashtreeError {
    /// HTTP status carried by this error.
    ///
    /// Transport-level failures report the 500 sentinel, matching the
    /// backend's `{success:false, status, message}` failure shape.
    pub fn status(&self) -> u16 {
        match self {
            CashtreeError::Http { status, .. } => *status,
            CashtreeError::InvalidCredentials(_) => 401,
            CashtreeError::Conflict(_) => 409,
            CashtreeError::Unreachable | CashtreeError::Request(_) => 500,
            _ => 0,
        }
    }
}

pub type Result<T> = std::result::Result<T, CashtreeError>;
