//! Authentication service for user registration, login, and token management.

use chrono::Utc;
use persistence::repositories::UserRepository;
use shared::crypto::sha256_hex;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtAuthConfig;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Password does not meet requirements")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User is disabled")]
    UserDisabled,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: domain::models::User,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_in: i64,
}

/// Result of a successful token refresh.
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Token pair with the JTIs used for session tracking.
#[derive(Debug, Clone)]
struct TokenPair {
    access_token: String,
    access_token_jti: String,
    refresh_token: String,
    refresh_token_jti: String,
}

/// Authentication service.
pub struct AuthService {
    repo: UserRepository,
    jwt_config: JwtConfig,
    access_token_expiry: i64,
}

impl AuthService {
    /// Creates a new AuthService with the given database pool and JWT configuration.
    pub fn new(pool: PgPool, jwt_config: &JwtAuthConfig) -> Result<Self, AuthError> {
        let jwt = JwtConfig::with_leeway(
            &jwt_config.private_key,
            &jwt_config.public_key,
            jwt_config.access_token_expiry_secs,
            jwt_config.refresh_token_expiry_secs,
            jwt_config.leeway_secs,
        )
        .map_err(|e| AuthError::Internal(format!("Failed to initialize JWT: {}", e)))?;

        Ok(Self {
            repo: UserRepository::new(pool),
            jwt_config: jwt,
            access_token_expiry: jwt_config.access_token_expiry_secs,
        })
    }

    /// Register a new user with email and password.
    ///
    /// New accounts start as hunters with zero points and score.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthResult, AuthError> {
        self.validate_password(password)?;

        let password_hash = hash_password(password)?;
        let email = email.to_lowercase();

        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let user = match self.repo.create_user(&email, &password_hash, display_name).await {
            Ok(user) => user,
            // 23505 = unique_violation: concurrent registration of the same email
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23505") =>
            {
                return Err(AuthError::EmailAlreadyExists);
            }
            Err(e) => return Err(e.into()),
        };

        let tokens = self.generate_tokens(user.id)?;
        self.create_session(user.id, &tokens).await?;

        Ok(AuthResult {
            user: user.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_token_expires_in: self.access_token_expiry,
        })
    }

    /// Login with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let user = self
            .repo
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let password_hash = user
            .password_hash
            .clone()
            .ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(password, &password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.repo.update_last_login(user.id, Utc::now()).await?;

        let tokens = self.generate_tokens(user.id)?;
        self.create_session(user.id, &tokens).await?;

        Ok(AuthResult {
            user: user.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_token_expires_in: self.access_token_expiry,
        })
    }

    /// Refresh the token pair using a valid refresh token.
    ///
    /// Implements token rotation: the presented refresh token's session is
    /// re-keyed to a new pair, invalidating the old refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResult, AuthError> {
        let claims = self
            .jwt_config
            .validate_refresh_token(refresh_token)
            .map_err(|e| match e {
                JwtError::TokenExpired | JwtError::InvalidToken => AuthError::InvalidRefreshToken,
                _ => AuthError::TokenError(e),
            })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;
        let jti_hash = sha256_hex(&claims.jti);

        let session = self
            .repo
            .find_session_by_refresh_hash(&jti_hash, user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.expires_at < Utc::now() {
            self.repo.delete_session(session.id).await?;
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let tokens = self.generate_tokens(user_id)?;
        let expires_at =
            Utc::now() + chrono::Duration::seconds(self.jwt_config.refresh_token_expiry_secs);

        self.repo
            .rotate_session(
                session.id,
                &sha256_hex(&tokens.access_token_jti),
                &sha256_hex(&tokens.refresh_token_jti),
                expires_at,
            )
            .await?;

        Ok(RefreshResult {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: self.access_token_expiry,
        })
    }

    /// Logout by invalidating the session associated with the refresh token.
    ///
    /// If `all_devices` is true, invalidates all sessions for the user.
    pub async fn logout(&self, refresh_token: &str, all_devices: bool) -> Result<(), AuthError> {
        let claims = self
            .jwt_config
            .validate_refresh_token(refresh_token)
            .map_err(|e| match e {
                JwtError::TokenExpired | JwtError::InvalidToken => AuthError::InvalidRefreshToken,
                _ => AuthError::TokenError(e),
            })?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidRefreshToken)?;

        if all_devices {
            self.repo.delete_all_sessions(user_id).await?;
        } else {
            let jti_hash = sha256_hex(&claims.jti);
            let deleted = self
                .repo
                .delete_session_by_refresh_hash(&jti_hash, user_id)
                .await?;

            // Already logged out is not an error
            if !deleted {
                tracing::debug!(user_id = %user_id, "Session not found during logout");
            }
        }

        Ok(())
    }

    /// Validate password meets security requirements.
    ///
    /// Requirements:
    /// - Minimum 8 characters
    /// - At least 1 uppercase letter
    /// - At least 1 lowercase letter
    /// - At least 1 digit
    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.len() < 8 {
            return Err(AuthError::WeakPassword(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one uppercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one lowercase letter".to_string(),
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::WeakPassword(
                "Password must contain at least one digit".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate access and refresh tokens for a user.
    fn generate_tokens(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let (access_token, access_jti) = self.jwt_config.generate_access_token(user_id)?;
        let (refresh_token, refresh_jti) = self.jwt_config.generate_refresh_token(user_id)?;

        Ok(TokenPair {
            access_token,
            access_token_jti: access_jti,
            refresh_token,
            refresh_token_jti: refresh_jti,
        })
    }

    /// Create a session for the user with the generated tokens.
    ///
    /// The JTIs are hashed for storage so a leaked sessions table cannot
    /// be used to forge tokens.
    async fn create_session(&self, user_id: Uuid, tokens: &TokenPair) -> Result<(), AuthError> {
        let expires_at =
            Utc::now() + chrono::Duration::seconds(self.jwt_config.refresh_token_expiry_secs);

        self.repo
            .create_session(
                user_id,
                &sha256_hex(&tokens.access_token_jti),
                &sha256_hex(&tokens.refresh_token_jti),
                expires_at,
            )
            .await?;

        Ok(())
    }
}
