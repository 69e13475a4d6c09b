use std::sync::Arc;

use crate::{
    auth::{TokenKeys, password},
    dto::{CredentialsRequest, MessageResponse, TokenResponse},
    error::ApiError,
    repository::{Store, StoreError},
};

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenKeys>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenKeys>) -> Self {
        Self { store, tokens }
    }

    /// Creates the account. A taken username is detected by the insert itself,
    /// never by a lookup beforehand.
    pub async fn register(&self, request: CredentialsRequest) -> Result<MessageResponse, ApiError> {
        if request.username.trim().is_empty() || request.password.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Username and password required".to_string(),
            ));
        }

        let secret = request.password;
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&secret))
            .await
            .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
            .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))?;

        match self.store.insert_user(&request.username, &hash).await {
            Ok(user_id) => {
                tracing::info!(user_id, "user registered");
                Ok(MessageResponse::new("User registered"))
            }
            Err(StoreError::UniqueViolation(_)) => Err(ApiError::UsernameTaken),
            Err(e) => Err(e.into()),
        }
    }

    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, request: CredentialsRequest) -> Result<TokenResponse, ApiError> {
        let user = self.store.find_user_by_username(&request.username).await?;

        let secret = request.password;
        let Some(user) = user else {
            tokio::task::spawn_blocking(move || password::verify_absent(&secret))
                .await
                .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))?;
            return Err(ApiError::InvalidCredentials);
        };

        let stored = user.password_hash;
        let matches = tokio::task::spawn_blocking(move || password::verify_password(&secret, &stored))
            .await
            .map_err(|e| ApiError::Internal(format!("password check task failed: {e}")))?
            .map_err(|e| ApiError::Internal(format!("stored password hash is unreadable: {e}")))?;

        if !matches {
            return Err(ApiError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))?;

        tracing::info!(user_id = user.id, username = %user.username, "user logged in");

        Ok(TokenResponse { token })
    }
}
