use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use projex_auth::{
    TemporaryToken, create_access_token, create_refresh_token, generate_temporary_token,
    hash_token, verify_refresh_token,
};
use projex_config::JwtConfig;
use projex_core::file_storage::AVATAR_MIME_TYPES;
use projex_core::{AppError, FileStorage, hash_password, verify_password};

use crate::metrics;
use crate::modules::users::model::{
    ChangePasswordDto, LoginRequest, RegisterUserDto, TokenPair, User,
};
use crate::utils::multipart::UploadedFile;
use crate::utils::uploads::{discard_files, store_upload};

const INVALID_CREDENTIALS: &str = "Incorrect email or password";
const INVALID_TOKEN: &str = "Token is invalid or expired";
const STALE_REFRESH_TOKEN: &str = "Refresh token is expired or used";

fn user_exists() -> AppError {
    AppError::conflict(anyhow!("User with email or username already exists"))
}

pub struct UserService;

impl UserService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn find_by_id(db: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User does not exist")))
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(db)
            .await?;

        Ok(user)
    }

    /// Creates an unverified user and returns the verification token to mail out.
    #[instrument(
        skip(db, storage, dto, avatar),
        fields(db.operation = "INSERT", db.table = "users", user.username = %dto.username)
    )]
    pub async fn register(
        db: &PgPool,
        storage: &dyn FileStorage,
        dto: RegisterUserDto,
        avatar: Option<&UploadedFile>,
    ) -> Result<(User, TemporaryToken), AppError> {
        let email = dto.email.to_lowercase();

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 OR username = $2)",
        )
        .bind(&email)
        .bind(&dto.username)
        .fetch_one(db)
        .await?;

        if taken {
            return Err(user_exists());
        }

        let stored_avatar = match avatar {
            Some(file) => Some(store_upload(storage, "avatars", file, AVATAR_MIME_TYPES).await?),
            None => None,
        };

        let password_hash = hash_password(&dto.password)?;
        let token = generate_temporary_token();

        let inserted = sqlx::query_as::<_, User>(
            r#"INSERT INTO users
                (email, username, full_name, password, avatar_url, avatar_key,
                 email_verification_token, email_verification_expiry)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(&email)
        .bind(&dto.username)
        .bind(&dto.full_name)
        .bind(&password_hash)
        .bind(stored_avatar.as_ref().map(|a| a.url.as_str()))
        .bind(stored_avatar.as_ref().map(|a| a.key.as_str()))
        .bind(&token.hashed)
        .bind(token.expires_at)
        .fetch_one(db)
        .await;

        let user = match inserted {
            Ok(user) => user,
            Err(e) => {
                if let Some(avatar) = &stored_avatar {
                    discard_files(storage, &[avatar.key.as_str()]).await;
                }
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return Err(user_exists());
                }
                return Err(AppError::database(e));
            }
        };

        info!(user.id = %user.id, "User registered");
        Ok((user, token))
    }

    #[instrument(skip(db, token), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn verify_email(db: &PgPool, token: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"UPDATE users
               SET is_email_verified = TRUE,
                   email_verification_token = NULL,
                   email_verification_expiry = NULL,
                   updated_at = NOW()
               WHERE email_verification_token = $1 AND email_verification_expiry > NOW()
               RETURNING *"#,
        )
        .bind(hash_token(token))
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!(INVALID_TOKEN)))
    }

    #[instrument(skip(db, dto, jwt_config), fields(db.table = "users"))]
    pub async fn login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<(User, TokenPair), AppError> {
        let Some(user) = Self::find_by_email(db, &dto.email).await? else {
            metrics::track_login_failure("unknown_email");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &user.password)? {
            metrics::track_login_failure("wrong_password");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let tokens = Self::issue_tokens(db, jwt_config, &user).await?;
        metrics::track_login_success();

        Ok((user, tokens))
    }

    /// Mints a token pair and stores the refresh token, replacing any previous one.
    #[instrument(skip(db, jwt_config, user), fields(db.operation = "UPDATE", db.table = "users", user.id = %user.id))]
    pub async fn issue_tokens(
        db: &PgPool,
        jwt_config: &JwtConfig,
        user: &User,
    ) -> Result<TokenPair, AppError> {
        let access_token = create_access_token(user.id, &user.email, &user.username, jwt_config)?;
        let refresh_token = create_refresh_token(user.id, jwt_config)?;

        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(user.id)
            .bind(&refresh_token)
            .execute(db)
            .await?;

        metrics::track_tokens_issued();

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Exchanges the user's current refresh token for a new pair.
    ///
    /// The swap is a compare-and-set on the stored token, so two concurrent
    /// refreshes with the same token cannot both succeed.
    #[instrument(skip(db, jwt_config, refresh_token), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn refresh_tokens(
        db: &PgPool,
        jwt_config: &JwtConfig,
        refresh_token: &str,
    ) -> Result<(User, TokenPair), AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;
        let user_id = claims.user_id()?;

        let user = Self::find_by_id(db, user_id)
            .await
            .map_err(|e| match e.status.as_u16() {
                404 => AppError::unauthorized("Invalid refresh token"),
                _ => e,
            })?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            return Err(AppError::unauthorized(STALE_REFRESH_TOKEN));
        }

        let access_token = create_access_token(user.id, &user.email, &user.username, jwt_config)?;
        let new_refresh_token = create_refresh_token(user.id, jwt_config)?;

        let rotated = sqlx::query(
            "UPDATE users SET refresh_token = $3, updated_at = NOW() WHERE id = $1 AND refresh_token = $2",
        )
        .bind(user.id)
        .bind(refresh_token)
        .bind(&new_refresh_token)
        .execute(db)
        .await?;

        if rotated.rows_affected() == 0 {
            return Err(AppError::unauthorized(STALE_REFRESH_TOKEN));
        }

        Ok((
            user,
            TokenPair {
                access_token,
                refresh_token: new_refresh_token,
            },
        ))
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn logout(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = NULL, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await?;

        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn resend_email_verification(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<(User, TemporaryToken), AppError> {
        let user = Self::find_by_id(db, user_id).await?;

        if user.is_email_verified {
            return Err(AppError::conflict(anyhow!("Email is already verified")));
        }

        let token = generate_temporary_token();

        sqlx::query(
            r#"UPDATE users
               SET email_verification_token = $2, email_verification_expiry = $3, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(user.id)
        .bind(&token.hashed)
        .bind(token.expires_at)
        .execute(db)
        .await?;

        Ok((user, token))
    }

    /// Stores a reset token for the account, if there is one. Unknown emails yield `None`.
    #[instrument(skip(db, email), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn forgot_password(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<(User, TemporaryToken)>, AppError> {
        let Some(user) = Self::find_by_email(db, email).await? else {
            return Ok(None);
        };

        let token = generate_temporary_token();

        sqlx::query(
            r#"UPDATE users
               SET forgot_password_token = $2, forgot_password_expiry = $3, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(user.id)
        .bind(&token.hashed)
        .bind(token.expires_at)
        .execute(db)
        .await?;

        Ok(Some((user, token)))
    }

    /// Sets a new password from a reset link and signs out every session.
    #[instrument(skip(db, token, new_password), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn reset_password(
        db: &PgPool,
        token: &str,
        new_password: &str,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(new_password)?;

        sqlx::query_as::<_, User>(
            r#"UPDATE users
               SET password = $2,
                   forgot_password_token = NULL,
                   forgot_password_expiry = NULL,
                   refresh_token = NULL,
                   updated_at = NOW()
               WHERE forgot_password_token = $1 AND forgot_password_expiry > NOW()
               RETURNING *"#,
        )
        .bind(hash_token(token))
        .bind(&password_hash)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!(INVALID_TOKEN)))
    }

    /// Sets a new password. The stored refresh token is dropped, so no session can be renewed.
    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<User, AppError> {
        let user = Self::find_by_id(db, user_id).await?;

        if !verify_password(&dto.old_password, &user.password)? {
            return Err(AppError::bad_request(anyhow!("Invalid old password")));
        }

        let password_hash = hash_password(&dto.new_password)?;

        sqlx::query(
            "UPDATE users SET password = $2, refresh_token = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(user.id)
        .bind(&password_hash)
        .execute(db)
        .await?;

        Ok(user)
    }
}
