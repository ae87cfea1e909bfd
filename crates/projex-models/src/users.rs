//! User entity and registration/profile DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use projex_core::serde::trimmed;

/// A user row. Credentials and token columns never leave the server.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password: String,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub avatar_key: Option<String>,
    pub is_email_verified: bool,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub email_verification_token: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub email_verification_expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub forgot_password_token: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub forgot_password_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection used inside member and task listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Usernames are lowercase letters, digits and underscores.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_format");
        err.message = Some("Username must be lowercase letters, digits or underscores".into());
        Err(err)
    }
}

/// Registration form fields. Sent as multipart alongside an optional `avatar` file.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserDto {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Email is invalid"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(
        length(min = 3, max = 13, message = "Username must be 3 to 13 characters"),
        custom(function = "validate_username")
    )]
    #[schema(example = "ada")]
    pub username: String,
    #[validate(length(min = 6, max = 20, message = "Password must be 6 to 20 characters"))]
    pub password: String,
    #[serde(alias = "fullname", deserialize_with = "trimmed")]
    #[validate(length(min = 1, message = "Full name is required"))]
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDto {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub old_password: String,
    #[validate(length(min = 6, max = 20, message = "Password must be 6 to 20 characters"))]
    pub new_password: String,
}
