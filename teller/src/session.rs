//! Persisted operator session.
//!
//! The backend keeps no server-side session; the bearer token and the user
//! record from login live in a JSON file under the platform data directory
//! and are restored on every invocation. Logout deletes the file.

use std::fs;
use std::path::PathBuf;

use cashtree::AuthSession;
use tracing::debug;

use crate::error::TellerError;

const SESSION_FILE: &str = "session.json";

/// `<data_dir>/teller/session.json`, falling back to the working directory
/// when the platform has no data dir.
pub fn session_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("teller")
        .join(SESSION_FILE)
}

pub fn load() -> Result<Option<AuthSession>, TellerError> {
    let path = session_path();
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)?;
    let session = serde_json::from_str(&raw)?;
    debug!(path = %path.display(), "session loaded");
    Ok(Some(session))
}

pub fn save(session: &AuthSession) -> Result<(), TellerError> {
    let path = session_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, serde_json::to_string_pretty(session)?)?;
    debug!(path = %path.display(), "session saved");
    Ok(())
}

/// Remove the session file. Returns whether one existed.
pub fn clear() -> Result<bool, TellerError> {
    let path = session_path();
    if path.exists() {
        fs::remove_file(&path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}
