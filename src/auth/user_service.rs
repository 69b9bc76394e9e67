//! User directory administration.

use std::sync::Arc;

use argon2::Argon2;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::hashing;
use crate::auth::user::{NewUser, User};
use crate::auth::validation::CreateUserRequest;
use crate::config::AuthConfig;
use crate::domain::UserId;
use crate::errors::Result;
use crate::storage::{DbPool, SqlxUserRepository, UserRepository};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Argon2<'static>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Argon2<'static>) -> Self {
        Self { users, hasher }
    }

    pub fn with_sqlx(pool: DbPool, config: &AuthConfig) -> Result<Self> {
        let hasher = hashing::password_hasher(config.argon2_memory_kib, config.argon2_iterations)?;
        Ok(Self::new(Arc::new(SqlxUserRepository::new(pool)), hasher))
    }

    /// Add a user with an Argon2id hash of `request.password`.
    ///
    /// A duplicate email is a `Conflict`.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<User> {
        request.validate()?;

        let password_hash = hashing::hash_password(&self.hasher, &request.password)?;
        let user = self
            .users
            .create_user(NewUser {
                id: UserId::new(),
                email: request.email.clone(),
                name: request.name.clone(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }
}
