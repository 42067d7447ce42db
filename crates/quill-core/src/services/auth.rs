use std::sync::Arc;

use uuid::Uuid;

use crate::domain::User;
use crate::error::{DomainError, RepoError};
use crate::ports::{AuthError, PasswordService, TokenClaims, TokenService, UserRepository};
use crate::validation::{self, Credentials};

/// A freshly issued token together with the account it belongs to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Registration, login and identity resolution.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
    passwords: Arc<dyn PasswordService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
        }
    }

    /// Create an account and sign it in.
    ///
    /// Without an explicit email the account gets a placeholder address derived
    /// from the username.
    pub async fn register(
        &self,
        credentials: Credentials,
        email: Option<String>,
    ) -> Result<Session, DomainError> {
        validation::check(&credentials)?;

        if self
            .users
            .find_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict("Username is already taken".to_string()));
        }

        let password_hash = self.hash_password(credentials.password).await?;
        let email = email
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| format!("{}@test.com", credentials.username));

        let user = User::new(credentials.username, email, password_hash);
        let user = self.users.insert(user).await.map_err(|e| match e {
            RepoError::Constraint(_) => {
                DomainError::Conflict("Username is already taken".to_string())
            }
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue(user)
    }

    /// Check a username/password pair and issue a new token.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            tracing::debug!(username = %username, "Login for unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self
            .verify_password(password.to_string(), user.password_hash.clone())
            .await?
        {
            tracing::debug!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue(user)
    }

    /// Tokens are stateless, so there is nothing to revoke server-side.
    pub fn logout(&self, user_id: Uuid) {
        tracing::info!(user_id = %user_id, "User logged out");
    }

    /// Resolve the identity carried by a bearer token.
    pub fn authenticate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.tokens.validate_token(token)
    }

    /// The account behind an authenticated identity.
    pub async fn current_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, password: String) -> Result<String, DomainError> {
        let passwords = self.passwords.clone();
        let hash = tokio::task::spawn_blocking(move || passwords.hash(&password))
            .await
            .map_err(|e| {
                DomainError::Internal(format!("Password hashing task failed: {e}"))
            })??;
        Ok(hash)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, DomainError> {
        let passwords = self.passwords.clone();
        let valid = tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
            .await
            .map_err(|e| {
                DomainError::Internal(format!("Password verification task failed: {e}"))
            })??;
        Ok(valid)
    }

    fn issue(&self, user: User) -> Result<Session, DomainError> {
        let token = self.tokens.generate_token(user.id, &user.username)?;
        Ok(Session {
            token,
            expires_in: self.tokens.expiration_seconds(),
            user,
        })
    }
}
