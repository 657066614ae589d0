use rust_decimal::Decimal;

use crate::error::{CashtreeError, Result};
use crate::rest::CashtreeHttpClient;
use crate::tree::{self, UserNode};
use crate::types::*;

impl CashtreeHttpClient {
    // --- Auth ---

    /// POST /auth/register - Create a sub-account under a creator.
    ///
    /// The username rule is checked here, before any network traffic.
    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse> {
        validate_username(&request.username)?;
        self.post("/auth/register", request).await
    }

    /// POST /auth/login - Exchange credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        self.post(
            "/auth/login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    // --- Users ---

    /// GET /auth/user/{id} - Single user record.
    pub async fn get_user(&self, id: &str) -> Result<UserRecord> {
        let envelope: UserEnvelope = self.get(&format!("/auth/user/{id}"), &[]).await?;
        Ok(envelope.user)
    }

    /// GET /auth/usersByCreater/{id} - Whole subtree rooted at a creator,
    /// returned in one fetch (no N+1).
    pub async fn get_subtree(&self, creator_id: &str) -> Result<UserNode> {
        let envelope: SubtreeEnvelope = self
            .get(&format!("/auth/usersByCreater/{creator_id}"), &[])
            .await?;
        tree::build_tree(&envelope.into_payload()?)
    }

    /// GET /auth/getallusers - Every account visible to the operator.
    pub async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
        let envelope: UsersEnvelope = self.get("/auth/getallusers", &[]).await?;
        Ok(envelope.users)
    }

    /// POST /auth/usersByRole - Accounts filtered by role.
    pub async fn get_users_by_role(&self, role: Role) -> Result<Vec<UserRecord>> {
        let envelope: UsersEnvelope = self
            .post("/auth/usersByRole", &serde_json::json!({ "role": role }))
            .await?;
        Ok(envelope.users)
    }

    /// POST /auth/getBalance - Balance lookup by username.
    pub async fn get_balance(&self, username: &str) -> Result<Decimal> {
        let envelope: BalanceEnvelope = self
            .post("/auth/getBalance", &serde_json::json!({ "username": username }))
            .await?;
        Ok(envelope.balance)
    }

    /// PUT /auth/update - Change username/password/role/balance.
    pub async fn update_user(&self, request: &UpdateUserRequest) -> Result<UpdateResponse> {
        if let Some(username) = &request.username {
            validate_username(username)?;
        }
        self.put("/auth/update", request).await
    }

    /// DELETE /auth/delete_user/{id} - Remove an account by id.
    pub async fn delete_user(&self, id: &str) -> Result<MessageResponse> {
        self.delete(&format!("/auth/delete_user/{id}")).await
    }

    /// DELETE /auth/delete_user - Remove an account by username (legacy).
    pub async fn delete_user_by_username(&self, username: &str) -> Result<MessageResponse> {
        self.delete_with_body(
            "/auth/delete_user",
            &serde_json::json!({ "username": username }),
        )
        .await
    }

    // --- Transfers ---

    /// POST /tr/transfer - Move funds between two accounts.
    ///
    /// Rejects non-positive amounts before any network call.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse> {
        if request.amount <= Decimal::ZERO {
            return Err(CashtreeError::Validation(
                "transfer amount must be positive".into(),
            ));
        }
        self.post("/tr/transfer", request).await
    }

    /// GET /tr/all-transfers - Full transfer list.
    pub async fn get_all_transfers(&self) -> Result<Vec<TransferRecord>> {
        let envelope: TransfersEnvelope = self.get("/tr/all-transfers", &[]).await?;
        Ok(envelope.transfers)
    }

    /// GET /tr/transfer-history?username=&date= - Filtered history.
    pub async fn get_transfer_history(
        &self,
        username: Option<&str>,
        date: Option<&str>,
    ) -> Result<Vec<TransferRecord>> {
        let mut query = Vec::new();
        if let Some(u) = username {
            query.push(("username", u));
        }
        if let Some(d) = date {
            query.push(("date", d));
        }
        let envelope: TransferHistoryEnvelope = self.get("/tr/transfer-history", &query).await?;
        Ok(envelope.transfer_history)
    }
}
