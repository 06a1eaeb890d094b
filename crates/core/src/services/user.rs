//! User service: accounts, credentials and profile edits.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use vidtube_common::{AppError, AppResult, IdGenerator};
use vidtube_db::{entities::user, repositories::UserRepository};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, max = 128))]
    pub firstname: String,

    #[validate(length(min = 1, max = 128))]
    pub lastname: String,

    #[validate(length(min = 3, max = 64))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Input for signing in.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Partial profile update. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub firstname: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub lastname: Option<String>,

    #[validate(length(min = 3, max = 64))]
    pub username: Option<String>,

    #[validate(length(max = 2048))]
    pub channel_description: Option<String>,

    #[validate(url)]
    pub avatar: Option<String>,

    #[validate(url)]
    pub cover: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and issue its bearer token.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            firstname: Set(input.firstname),
            lastname: Set(input.lastname),
            username: Set(input.username),
            email: Set(input.email),
            password: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            channel_description: Set(None),
            avatar: Set(None),
            cover: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self
            .user_repo
            .create(model)
            .await
            .map_err(account_conflict)?;
        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        Ok(user)
    }

    /// Check credentials and return the account, rotating its token.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Apply a partial profile update to the viewer's own account.
    pub async fn edit_profile(&self, id: &str, input: EditProfileInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;

        if let Some(username) = input.username.as_deref() {
            if username != user.username
                && self.user_repo.find_by_username(username).await?.is_some()
            {
                return Err(AppError::BadRequest("Username already taken".to_string()));
            }
        }

        let mut active: user::ActiveModel = user.into();

        if let Some(firstname) = input.firstname {
            active.firstname = Set(firstname);
        }
        if let Some(lastname) = input.lastname {
            active.lastname = Set(lastname);
        }
        if let Some(username) = input.username {
            active.username = Set(username);
        }
        if let Some(description) = input.channel_description {
            active.channel_description = Set(Some(description));
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(Some(avatar));
        }
        if let Some(cover) = input.cover {
            active.cover = Set(Some(cover));
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await.map_err(account_conflict)
    }
}

/// Turn a unique index violation on the user table into the message the
/// pre-insert checks would have produced.
fn account_conflict(err: AppError) -> AppError {
    match err {
        AppError::Conflict(detail) if detail.contains("idx_user_username") => {
            AppError::BadRequest("Username already taken".to_string())
        }
        AppError::Conflict(detail) if detail.contains("idx_user_email") => {
            AppError::BadRequest("Email already registered".to_string())
        }
        AppError::Conflict(detail) => AppError::Database(detail),
        other => other,
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
