//! Client factory — resolves the backend URL and restores the persisted
//! session into a ready-to-use [`Cashtree`] client.

use cashtree::{AuthSession, Cashtree, CashtreeConfig};
use tracing::info;

use crate::error::TellerError;
use crate::session;

/// Production backend, used when neither `--api-url` nor `CASHTREE_API_URL`
/// is set.
pub const DEFAULT_API_URL: &str = "https://cashtree-production.up.railway.app";

/// A client paired with the operator it acts as.
pub struct TellerClient {
    pub api: Cashtree,
    pub session: AuthSession,
}

pub fn resolve_config(api_url: Option<String>) -> CashtreeConfig {
    match api_url {
        Some(url) => CashtreeConfig::new(url),
        None => CashtreeConfig::from_env().unwrap_or_else(|| CashtreeConfig::new(DEFAULT_API_URL)),
    }
}

/// Unauthenticated client (login/register flows).
pub fn connect(api_url: Option<String>) -> Cashtree {
    Cashtree::new(resolve_config(api_url))
}

/// Client armed with the persisted session token.
pub fn connect_authenticated(api_url: Option<String>) -> Result<TellerClient, TellerError> {
    let session = session::load()?.ok_or(TellerError::NotLoggedIn)?;
    let api = Cashtree::with_session(resolve_config(api_url), &session);
    info!(operator = %session.user.username, "session restored");
    Ok(TellerClient { api, session })
}
