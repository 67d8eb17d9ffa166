//! User service: accounts, credentials and profiles.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use devlink_common::{AppError, AppResult, IdGenerator};
use devlink_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use serde_json::json;
use tracing::info;

use crate::validation::{
    DEFAULT_AGE, DEFAULT_PHOTO_URL, LoginInput, PaginationQuery, ResetPasswordInput, SignupInput,
    UpdateProfileInput, normalize_skills, parse_gender,
};
use crate::views::{FeedPage, Pagination, PublicProfile};

/// Login failures are reported the same way whether the email or the password is wrong.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
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

    /// Create a new account.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        let input = input.prepare()?;

        // Check if email is taken
        if self.user_repo.find_by_email(&input.email_id).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let gender = input
            .gender
            .as_deref()
            .and_then(parse_gender)
            .unwrap_or_default();
        let skills = input
            .skills
            .as_deref()
            .map(normalize_skills)
            .unwrap_or_default();
        let now = Utc::now().into();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email_id),
            password_hash: Set(password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            age: Set(input.age.unwrap_or(DEFAULT_AGE)),
            gender: Set(gender),
            photo_url: Set(input
                .photo_url
                .unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string())),
            about: Set(input.about.unwrap_or_default()),
            skills: Set(json!(skills)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = self.user_repo.create(model).await?;
        info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Check credentials and return the account.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        let input = input.prepare()?;

        let user = self
            .user_repo
            .find_by_email(&input.email_id)
            .await?
            .ok_or_else(|| AppError::NotFound(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::NotFound(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by email, case-insensitively.
    pub async fn get_by_email(&self, email: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::UserNotFound("User not found".to_string()))
    }

    /// Apply a partial profile update.
    pub async fn update_profile(
        &self,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        let input = input.prepare()?;

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(age) = input.age {
            active.age = Set(age);
        }
        if let Some(gender) = input.gender.as_deref().and_then(parse_gender) {
            active.gender = Set(gender);
        }
        if let Some(photo_url) = input.photo_url {
            active.photo_url = Set(photo_url);
        }
        if let Some(about) = input.about {
            active.about = Set(about);
        }
        if let Some(skills) = input.skills {
            active.skills = Set(json!(normalize_skills(&skills)));
        }

        active.updated_at = Set(Utc::now().into());

        self.user_repo.update(active).await
    }

    /// Replace the user's password.
    pub async fn reset_password(&self, id: &str, input: ResetPasswordInput) -> AppResult<()> {
        validator::Validate::validate(&input)?;

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash_password(&input.password)?);
        active.updated_at = Set(Utc::now().into());

        self.user_repo.update(active).await?;
        info!(user_id = %id, "Password reset");
        Ok(())
    }

    /// Delete an account. Users may only delete themselves.
    pub async fn delete(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        if actor_id != target_id {
            return Err(AppError::Forbidden(
                "You can only delete your own account".to_string(),
            ));
        }

        let user = self.user_repo.get_by_id(target_id).await?;
        self.user_repo.delete(user).await?;
        info!(user_id = %target_id, "User deleted");
        Ok(())
    }

    /// Newest-first page of all users.
    pub async fn feed(&self, query: PaginationQuery) -> AppResult<FeedPage> {
        let page = query.resolve()?;

        let total = self.user_repo.count().await?;
        let users = match page.offset().filter(|offset| *offset < total) {
            Some(offset) => self.user_repo.find_page(offset, page.limit).await?,
            None => Vec::new(),
        };

        Ok(FeedPage {
            users: users.iter().map(PublicProfile::from).collect(),
            pagination: Pagination::new(page.page, page.limit, total),
        })
    }
}

/// Hash a password using Argon2.
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
