//! Request and response bodies for the Cashtree REST API.
//!
//! The backend is loose about envelope shapes (`user` vs `users`, `_id` vs
//! `id`). Everything is normalized here so the rest of the crate never
//! branches on payload shape.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CashtreeError, Result};
use crate::types::transfer::{TransferKind, TransferRecord};
use crate::types::user::{Role, UserRecord};

// --- Requests ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    /// Creator account id: the new user is attached under this node.
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body for `PUT /auth/update`. Only the supplied fields change.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub sender_id: String,
    pub receiver_id: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransferKind,
    pub note: String,
}

// --- Responses ---

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    pub user: UserRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsersEnvelope {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceEnvelope {
    pub balance: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub data: TransferData,
    #[serde(default)]
    pub updated_sender: Option<UserRecord>,
    #[serde(default)]
    pub updated_receiver: Option<UserRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferData {
    pub transfer: TransferRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransfersEnvelope {
    #[serde(default)]
    pub transfers: Vec<TransferRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferHistoryEnvelope {
    #[serde(default)]
    pub transfer_history: Vec<TransferRecord>,
}

/// Subtree responses arrive under `user` on current backends and `users` on
/// older ones. Either way the value is one root node with nested children.
#[derive(Debug, Clone, Deserialize)]
pub struct SubtreeEnvelope {
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub users: Option<serde_json::Value>,
}

impl SubtreeEnvelope {
    /// Unwrap whichever key is present.
    pub fn into_payload(self) -> Result<serde_json::Value> {
        self.user
            .or(self.users)
            .ok_or_else(|| CashtreeError::MalformedTree("subtree response has no user payload".into()))
    }
}

/// Failure body shape shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFailure {
    #[serde(default)]
    pub message: Option<String>,
}
