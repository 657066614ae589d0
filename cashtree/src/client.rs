use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::CashtreeConfig;
use crate::error::Result;
use crate::rest::CashtreeHttpClient;
use crate::tree::UserNode;
use crate::types::*;

/// An authenticated operator: the bearer token plus the record the backend
/// returned at login. Serializable so clients can persist it across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserRecord,
}

/// Main Cashtree client.
#[derive(Debug, Clone)]
pub struct Cashtree {
    /// Base URL for the backend.
    pub base_url: String,
    /// HTTP client (owns the bearer token).
    pub http_client: CashtreeHttpClient,
}

impl Cashtree {
    pub fn new(config: CashtreeConfig) -> Self {
        let http_client = CashtreeHttpClient::new(&config.base_url);
        Self {
            base_url: config.base_url,
            http_client,
        }
    }

    /// Restore a previously persisted session (no network traffic).
    pub fn with_session(config: CashtreeConfig, session: &AuthSession) -> Self {
        let mut client = Self::new(config);
        client.http_client.set_token(session.token.clone());
        client
    }

    /// Log in and keep the returned token for subsequent requests.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<AuthSession> {
        let response = self.http_client.login(username, password).await?;
        self.http_client.set_token(response.token.clone());
        Ok(AuthSession {
            token: response.token,
            user: response.user,
        })
    }

    /// Drop the bearer token. The backend keeps no server-side session.
    pub fn logout(&mut self) {
        self.http_client.clear_token();
    }

    // --- REST delegates ---

    /// Register a sub-account under `creator_id`.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
        creator_id: &str,
    ) -> Result<MessageResponse> {
        self.http_client
            .register(&RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
                role,
                id: creator_id.to_string(),
            })
            .await
    }

    /// Fetch a single user record by id.
    pub async fn get_user(&self, id: &str) -> Result<UserRecord> {
        self.http_client.get_user(id).await
    }

    /// Fetch the whole subtree created by `root_id`, ready to render.
    pub async fn fetch_tree(&self, root_id: &str) -> Result<UserNode> {
        self.http_client.get_subtree(root_id).await
    }

    /// Fetch every account visible to the operator.
    pub async fn all_users(&self) -> Result<Vec<UserRecord>> {
        self.http_client.get_all_users().await
    }

    /// Fetch accounts holding a given role.
    pub async fn users_by_role(&self, role: Role) -> Result<Vec<UserRecord>> {
        self.http_client.get_users_by_role(role).await
    }

    /// Look up a balance by username.
    pub async fn balance_of(&self, username: &str) -> Result<Decimal> {
        self.http_client.get_balance(username).await
    }

    /// Update an account's fields.
    pub async fn update_user(&self, request: &UpdateUserRequest) -> Result<UpdateResponse> {
        self.http_client.update_user(request).await
    }

    /// Delete an account by id.
    pub async fn delete_user(&self, id: &str) -> Result<MessageResponse> {
        self.http_client.delete_user(id).await
    }

    /// Move funds between two accounts.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse> {
        self.http_client.transfer(request).await
    }

    /// Deposit into `receiver_id` from `sender_id`.
    pub async fn deposit(
        &self,
        sender_id: &str,
        receiver_id: &str,
        amount: Decimal,
    ) -> Result<TransferResponse> {
        self.transfer(&TransferRequest {
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            amount,
            kind: TransferKind::Deposit,
            note: String::new(),
        })
        .await
    }

    /// Withdraw from `receiver_id` back to `sender_id`.
    pub async fn withdraw(
        &self,
        sender_id: &str,
        receiver_id: &str,
        amount: Decimal,
    ) -> Result<TransferResponse> {
        self.transfer(&TransferRequest {
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            amount,
            kind: TransferKind::Withdraw,
            note: String::new(),
        })
        .await
    }

    /// Fetch the full transfer list.
    pub async fn all_transfers(&self) -> Result<Vec<TransferRecord>> {
        self.http_client.get_all_transfers().await
    }

    /// Fetch transfer history filtered by username and/or date.
    pub async fn transfer_history(
        &self,
        username: Option<&str>,
        date: Option<&str>,
    ) -> Result<Vec<TransferRecord>> {
        self.http_client.get_transfer_history(username, date).await
    }
}
