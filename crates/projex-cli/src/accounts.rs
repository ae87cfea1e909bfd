//! Accounts created from the command line.

use projex_core::hash_password;
use sqlx::PgPool;
use uuid::Uuid;

/// Creates a user whose email is already verified.
pub async fn create_verified_user(
    db: &PgPool,
    email: &str,
    username: &str,
    full_name: &str,
    password: &str,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (email, username, full_name, password, is_email_verified)
         VALUES ($1, $2, $3, $4, TRUE)
         ON CONFLICT DO NOTHING
         RETURNING id",
    )
    .bind(email.to_lowercase())
    .bind(username)
    .bind(full_name)
    .bind(&hashed_password)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with email or username already exists".into())
}
