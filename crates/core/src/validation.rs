//! Input validation and normalization.
//!
//! Everything here is pure: inputs are sanitized (trimmed, lowercased where
//! the field is case-insensitive) and then checked with `validator` before a
//! service builds any entity from them.

#![allow(missing_docs)]

use std::sync::LazyLock;

use devlink_common::{AppError, AppResult, is_valid_id};
use devlink_db::entities::user::Gender;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Photo used when a user does not provide one.
pub const DEFAULT_PHOTO_URL: &str = "https://freesvg.org/img/abstract-user-flat-4.png";
/// Age used when a user does not provide one.
pub const DEFAULT_AGE: i32 = 18;
/// Maximum number of skills per profile.
pub const MAX_SKILLS: usize = 10;
/// Maximum length of a single skill.
pub const MAX_SKILL_LEN: usize = 50;
/// Maximum length of the about section.
pub const MAX_ABOUT_LEN: usize = 500;
/// Default feed page size.
pub const DEFAULT_LIMIT: u64 = 10;
/// Largest feed page size.
pub const MAX_LIMIT: u64 = 100;

#[allow(clippy::expect_used)]
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L} '\-]+$").expect("name pattern"));

#[allow(clippy::expect_used)]
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/?#]+[^\s]*$").expect("url pattern"));

#[allow(clippy::expect_used)]
static UNSAFE_MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<script|javascript:|\bon\w+\s*=").expect("markup pattern")
});

// === Field rules ===

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Letters, spaces, hyphens and apostrophes only.
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    if NAME_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid(
            "name",
            "Name must contain only letters, spaces, hyphens and apostrophes",
        ))
    }
}

/// Like [`validate_name`], but an empty value is allowed.
pub fn validate_optional_name(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Ok(())
    } else {
        validate_name(value)
    }
}

/// At least 8 characters with a lowercase, an uppercase, a digit and a symbol.
pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    let long_enough = value.chars().count() >= 8;
    let lower = value.chars().any(char::is_lowercase);
    let upper = value.chars().any(char::is_uppercase);
    let digit = value.chars().any(|c| c.is_ascii_digit());
    let symbol = value.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if long_enough && lower && upper && digit && symbol {
        Ok(())
    } else {
        Err(invalid(
            "password",
            "Password must be at least 8 characters with uppercase, lowercase, number, and special character",
        ))
    }
}

/// `M`, `F` or `O`, any case.
pub fn validate_gender(value: &str) -> Result<(), ValidationError> {
    parse_gender(value)
        .map(|_| ())
        .ok_or_else(|| invalid("gender", "Gender must be M, F, or O"))
}

/// An absolute http or https URL.
pub fn validate_photo_url(value: &str) -> Result<(), ValidationError> {
    if URL_RE.is_match(value) {
        Ok(())
    } else {
        Err(invalid("url", "Photo URL must be a valid HTTP or HTTPS URL"))
    }
}

/// Bounded length, no script tags or inline handlers.
pub fn validate_about(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_ABOUT_LEN {
        return Err(invalid(
            "about",
            "About section cannot exceed 500 characters",
        ));
    }
    if UNSAFE_MARKUP_RE.is_match(value) {
        return Err(invalid("about", "About section contains disallowed markup"));
    }
    Ok(())
}

/// At most ten entries, each non-blank and at most 50 characters.
pub fn validate_skills(skills: &[String]) -> Result<(), ValidationError> {
    let ok = skills.len() <= MAX_SKILLS
        && skills.iter().all(|s| {
            let trimmed = s.trim();
            !trimmed.is_empty() && trimmed.chars().count() <= MAX_SKILL_LEN
        });

    if ok {
        Ok(())
    } else {
        Err(invalid(
            "skills",
            "Skills must be an array of max 10 non-empty strings (max 50 chars each)",
        ))
    }
}

/// Parse a gender label, case-insensitively.
#[must_use]
pub fn parse_gender(value: &str) -> Option<Gender> {
    match value.trim().to_ascii_uppercase().as_str() {
        "M" => Some(Gender::Male),
        "F" => Some(Gender::Female),
        "O" => Some(Gender::Other),
        _ => None,
    }
}

/// Trim, drop blanks, and de-duplicate case-insensitively keeping the first spelling.
#[must_use]
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(ToString::to_string)
        .collect()
}

/// Check a user ID path/query parameter and return it lowercased.
pub fn parse_user_id(id: &str) -> AppResult<String> {
    let id = id.trim();
    if is_valid_id(id) {
        Ok(id.to_ascii_lowercase())
    } else {
        Err(AppError::BadRequest("Invalid user ID format".to_string()))
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn trim_option(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim_in_place(v);
    }
}

// === Inputs ===

/// Input for creating an account.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(
        length(min = 2, max = 50, message = "First name must be 2 to 50 characters"),
        custom(function = "validate_name")
    )]
    pub first_name: String,

    #[validate(
        length(max = 50, message = "Last name cannot exceed 50 characters"),
        custom(function = "validate_optional_name")
    )]
    pub last_name: String,

    #[validate(email(message = "Please provide a valid email address"))]
    pub email_id: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,

    #[validate(range(min = 16, max = 50, message = "Age must be between 16 and 50"))]
    pub age: Option<i32>,

    #[validate(custom(function = "validate_gender"))]
    pub gender: Option<String>,

    #[validate(custom(function = "validate_photo_url"))]
    pub photo_url: Option<String>,

    #[validate(custom(function = "validate_about"))]
    pub about: Option<String>,

    #[validate(custom(function = "validate_skills"))]
    pub skills: Option<Vec<String>>,
}

impl SignupInput {
    /// Trim text fields and lowercase the email.
    pub fn sanitize(&mut self) {
        trim_in_place(&mut self.first_name);
        trim_in_place(&mut self.last_name);
        self.email_id = self.email_id.trim().to_lowercase();
        trim_option(&mut self.gender);
        trim_option(&mut self.photo_url);
        trim_option(&mut self.about);
        // A blank photo URL means "use the default".
        if self.photo_url.as_deref() == Some("") {
            self.photo_url = None;
        }
    }

    /// Sanitize then validate.
    pub fn prepare(mut self) -> AppResult<Self> {
        self.sanitize();
        self.validate()?;
        Ok(self)
    }
}

/// Credentials for logging in.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email_id: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginInput {
    /// Normalize the email then validate.
    pub fn prepare(mut self) -> AppResult<Self> {
        self.email_id = self.email_id.trim().to_lowercase();
        self.validate()?;
        Ok(self)
    }
}

/// Partial profile update. Fields outside this set are rejected at
/// deserialization time.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileInput {
    #[validate(
        length(min = 2, max = 50, message = "First name must be 2 to 50 characters"),
        custom(function = "validate_name")
    )]
    pub first_name: Option<String>,

    #[validate(
        length(max = 50, message = "Last name cannot exceed 50 characters"),
        custom(function = "validate_optional_name")
    )]
    pub last_name: Option<String>,

    #[validate(range(min = 16, max = 50, message = "Age must be between 16 and 50"))]
    pub age: Option<i32>,

    #[validate(custom(function = "validate_gender"))]
    pub gender: Option<String>,

    #[validate(custom(function = "validate_photo_url"))]
    pub photo_url: Option<String>,

    #[validate(custom(function = "validate_about"))]
    pub about: Option<String>,

    #[validate(custom(function = "validate_skills"))]
    pub skills: Option<Vec<String>>,
}

impl UpdateProfileInput {
    /// Whether no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.photo_url.is_none()
            && self.about.is_none()
            && self.skills.is_none()
    }

    /// Reject empty updates, trim text fields, then validate.
    pub fn prepare(mut self) -> AppResult<Self> {
        if self.is_empty() {
            return Err(AppError::BadRequest("No update data provided".to_string()));
        }
        trim_option(&mut self.first_name);
        trim_option(&mut self.last_name);
        trim_option(&mut self.gender);
        trim_option(&mut self.photo_url);
        trim_option(&mut self.about);
        self.validate()?;
        Ok(self)
    }
}

/// New password for the logged-in user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordInput {
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// `?emailId=` lookup.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmailQuery {
    #[validate(email(message = "Please provide a valid email address"))]
    pub email_id: String,
}

/// Raw `?page=&limit=` query.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationQuery {
    /// 1-based page, default 1.
    pub page: Option<i64>,
    /// Page size, default 10.
    pub limit: Option<i64>,
}

/// Checked pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
}

impl Page {
    /// Rows to skip, or `None` when the page lies beyond any addressable row.
    #[must_use]
    pub fn offset(self) -> Option<u64> {
        self.page
            .checked_sub(1)?
            .checked_mul(self.limit)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

impl PaginationQuery {
    /// Apply defaults and bounds: `page >= 1`, `1 <= limit <= 100`.
    pub fn resolve(self) -> AppResult<Page> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT as i64);

        let page = u64::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| AppError::BadRequest("Page must be at least 1".to_string()))?;
        let limit = u64::try_from(limit)
            .ok()
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .ok_or_else(|| {
                AppError::BadRequest("Limit must be between 1 and 100".to_string())
            })?;

        Ok(Page { page, limit })
    }
}
