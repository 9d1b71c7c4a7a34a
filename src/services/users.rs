use crate::{
    auth::{AuthError, AuthService, TokenResponse},
    db::with_transaction,
    entities::{user, UserRole},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Registration payload; `role` defaults to buyer
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterUserInput {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "buyer@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "s3cure-pass", format = Password)]
    pub password: String,

    #[serde(default)]
    pub role: UserRole,
}

/// Public view of an account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            is_active: model.is_active,
        }
    }
}

/// Account registration and credential exchange
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn register(&self, input: RegisterUserInput) -> Result<UserResponse, ServiceError> {
        input.validate()?;
        if input.role == UserRole::Admin {
            return Err(ServiceError::ValidationError(
                "Role must be buyer or seller".to_string(),
            ));
        }

        let email = input.email.trim().to_lowercase();
        let hashed_password = self.auth.hash_password(&input.password)?;
        let role = input.role;

        let created = with_transaction::<_, _, ServiceError>(&self.db, move |txn| {
            Box::pin(async move {
                let taken = user::Entity::find()
                    .filter(user::Column::Email.eq(email.as_str()))
                    .one(txn)
                    .await?
                    .is_some();
                if taken {
                    return Err(ServiceError::Conflict("Email already registered".to_string()));
                }

                let model = user::ActiveModel {
                    email: Set(email),
                    hashed_password: Set(hashed_password),
                    role: Set(role),
                    is_active: Set(true),
                    ..Default::default()
                };
                Ok(model.insert(txn).await?)
            })
        })
        .await?;

        info!(user_id = created.id, "Registered user");
        Ok(created.into())
    }

    /// Exchanges email and password for an access token
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, ServiceError> {
        let email = email.trim().to_lowercase();
        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .filter(user::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;

        let account = match account {
            Some(account) if self.auth.verify_password(password, &account.hashed_password) => {
                account
            }
            _ => {
                warn!("Rejected login attempt");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let token = self.auth.generate_token(&account)?;
        info!(user_id = account.id, "Issued access token");
        Ok(token)
    }
}
