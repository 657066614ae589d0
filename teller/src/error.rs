use thiserror::Error;

#[derive(Debug, Error)]
pub enum TellerError {
    #[error("api error: {0}")]
    Api(#[from] cashtree::CashtreeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("not logged in; run `teller login <username>` first")]
    NotLoggedIn,

    #[error("terminal error: {0}")]
    Terminal(String),
}
