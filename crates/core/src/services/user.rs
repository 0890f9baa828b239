//! User service.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use wyr_common::{AppError, AppResult, IdGenerator};
use wyr_db::{
    entities::user::{self, ContentPreference},
    repositories::UserRepository,
};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
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

    /// Create a new user account.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        // Check if username is taken. The unique constraint still backstops
        // concurrent signups.
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::BadRequest("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            password_hash: Set(password_hash),
            token: Set(self.id_gen.generate_token()),
            content_preference: Set(ContentPreference::SafeOnly),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.user_repo.create(model).await
    }

    /// Authenticate a user by bearer token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Get a user's content preference.
    pub async fn content_preference(&self, user_id: &str) -> AppResult<ContentPreference> {
        Ok(self.user_repo.get_by_id(user_id).await?.content_preference)
    }

    /// Set a user's content preference.
    pub async fn set_content_preference(
        &self,
        user_id: &str,
        preference: ContentPreference,
    ) -> AppResult<ContentPreference> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.content_preference = Set(preference);

        Ok(self.user_repo.update(active).await?.content_preference)
    }
}

/// Hash a password with Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn create_input_rejects_short_password() {
        let input = CreateUserInput {
            username: "alice".to_string(),
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn signin_with_bad_password_is_unauthorized() {
        let hash = hash_password("the-real-password").unwrap();
        let user = user::Model {
            id: "user1".to_string(),
            username: "alice".to_string(),
            username_lower: "alice".to_string(),
            password_hash: hash,
            token: "tok".to_string(),
            content_preference: ContentPreference::SafeOnly,
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate("alice", "guess").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
