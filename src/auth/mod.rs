/*!
 * # Authentication Module
 *
 * Password hashing, bearer token issuance and validation, and the
 * [`AuthUser`] extractor that resolves a bearer token to an active account.
 *
 * Tokens are HS256 JWTs carrying the account email (`sub`), id and role.
 * The role stored on the account row is authoritative; the claim is only
 * informational for clients.
 */

use crate::{
    entities::{user, UserRole},
    errors::ServiceError,
    AppState,
};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

mod rbac;

pub use rbac::*;

/// Claim structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,    // Subject (account email)
    pub id: i32,        // Account id
    pub role: UserRole, // Role at issuance
    pub iat: i64,       // Issued at time
    pub exp: i64,       // Expiration time
    pub iss: String,    // Issuer
    pub aud: String,    // Audience
}

/// Authenticated account resolved from a bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }
}

impl From<user::Model> for AuthUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
        }
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }

    pub fn from_app_config(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration),
        )
    }
}

/// Bearer token returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiJ9...")]
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

/// Authentication service that handles hashing and token issuance/validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Hashes a password into an argon2 PHC string with a fresh salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// A malformed stored hash counts as a mismatch
    pub fn verify_password(&self, password: &str, hashed: &str) -> bool {
        match PasswordHash::new(hashed) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                warn!("Stored password hash could not be parsed: {}", e);
                false
            }
        }
    }

    /// Issues an access token for the given account
    pub fn generate_token(&self, account: &user::Model) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::TokenCreation("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: account.email.clone(),
            id: account.id,
            role: account.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Validates signature, expiry, issuer and audience
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    /// Loads the active account a token was issued for
    pub async fn resolve_user(&self, claims: &Claims) -> Result<AuthUser, AuthError> {
        let account = user::Entity::find_by_id(claims.id)
            .filter(user::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if account.email != claims.sub {
            debug!(user_id = account.id, "Token subject no longer matches account");
            return Err(AuthError::InvalidToken);
        }

        Ok(account.into())
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token.trim())
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingToken,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::InvalidCredentials => ServiceError::Unauthorized(err.to_string()),
            AuthError::TokenCreation(msg) => ServiceError::JwtError(msg),
            AuthError::Hash(msg) => ServiceError::HashError(msg),
            AuthError::Database(db) => ServiceError::DatabaseError(db),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let mut response = ServiceError::from(self).into_response();
        if response.status() == axum::http::StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.auth.validate_token(token)?;
        state.auth.resolve_user(&claims).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service_with(db: DatabaseConnection) -> AuthService {
        AuthService::new(
            AuthConfig::new(
                "kP7dQ2vX9mL4sT8wZ1nB6cF3hJ5yR0aE".into(),
                "storefront-api".into(),
                "storefront-auth".into(),
                Duration::from_secs(1800),
            ),
            Arc::new(db),
        )
    }

    fn service() -> AuthService {
        service_with(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    fn account(role: UserRole) -> user::Model {
        user::Model {
            id: 7,
            email: "seller@example.com".into(),
            hashed_password: String::new(),
            role,
            is_active: true,
        }
    }

    #[test]
    fn password_hash_verifies_only_original() {
        let auth = service();
        let hash = auth.hash_password("correct horse").unwrap();
        assert!(auth.verify_password("correct horse", &hash));
        assert!(!auth.verify_password("wrong horse", &hash));
        assert!(!auth.verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let auth = service();
        let token = auth.generate_token(&account(UserRole::Seller)).unwrap();
        assert_eq!(token.token_type, "bearer");

        let claims = auth.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, "seller@example.com");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.role, UserRole::Seller);
        assert_eq!(claims.aud, "storefront-api");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issuer = service();
        let token = issuer.generate_token(&account(UserRole::Buyer)).unwrap();

        let mut other = service();
        other.config.jwt_secret = "zZ9yY8xX7wW6vV5uU4tT3sS2rR1qQ0pP".into();
        assert_matches!(
            other.validate_token(&token.access_token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let auth = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "buyer@example.com".into(),
            id: 1,
            role: UserRole::Buyer,
            iat: now - 7200,
            exp: now - 3600,
            iss: auth.config.jwt_issuer.clone(),
            aud: auth.config.jwt_audience.clone(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(auth.config.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert_matches!(auth.validate_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_matches!(bearer_token(&headers), Err(AuthError::MissingToken));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_matches!(bearer_token(&headers), Err(AuthError::InvalidToken));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[tokio::test]
    async fn resolve_user_rejects_inactive_or_missing_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let auth = service_with(db);
        let token = auth.generate_token(&account(UserRole::Seller)).unwrap();
        let claims = auth.validate_token(&token.access_token).unwrap();

        assert_matches!(
            auth.resolve_user(&claims).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn resolve_user_uses_stored_role() {
        let mut stored = account(UserRole::Buyer);
        stored.email = "seller@example.com".into();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .into_connection();
        let auth = service_with(db);
        let token = auth.generate_token(&account(UserRole::Seller)).unwrap();
        let claims = auth.validate_token(&token.access_token).unwrap();

        let user = auth.resolve_user(&claims).await.unwrap();
        assert_eq!(user.role, UserRole::Buyer);
    }

    #[test]
    fn unauthorized_response_carries_challenge() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
