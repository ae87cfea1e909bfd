use axum::{
    body::Bytes,
    extract::{Path, State},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{instrument, warn};

use projex_core::{ApiResponse, AppError, Empty};

use crate::metrics;
use crate::middleware::auth::AuthUser;
use crate::modules::users::model::{
    ChangePasswordDto, EmailVerifiedResponse, ForgotPasswordRequest, LoginRequest, LoginResponse,
    RefreshTokenRequest, RegisterForm, RegisterUserDto, ResetPasswordRequest, TokenPair, User,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::cookies::{REFRESH_TOKEN_COOKIE, clear_auth_cookies, set_auth_cookies};
use crate::utils::email::{EmailContent, EmailService};
use crate::utils::multipart::ValidatedMultipart;
use crate::validator::ValidatedJson;

/// Mail failures never fail the request.
async fn deliver(state: &AppState, to: &str, content: EmailContent) {
    if let Err(e) = EmailService::new(state.email_config.clone())
        .send(to, content)
        .await
    {
        warn!(email.to = %to, error = %e.error, "Failed to send email");
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "User registered, verification email sent", body = User),
        (status = 400, description = "Missing or malformed field", body = projex_core::ErrorBody),
        (status = 409, description = "Email or username already taken", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed or avatar rejected", body = projex_core::ErrorBody)
    ),
    tag = "Users"
)]
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    form: ValidatedMultipart<RegisterUserDto>,
) -> Result<ApiResponse<User>, AppError> {
    let avatar = form.files_named("avatar").next().cloned();

    let (user, token) =
        UserService::register(&state.db, state.storage.as_ref(), form.data, avatar.as_ref())
            .await?;
    metrics::track_user_registered();

    let content = EmailService::new(state.email_config.clone())
        .verification_email(&user.username, &token.unhashed);
    deliver(&state, &user.email, content).await;

    Ok(ApiResponse::created(
        user,
        "User registered successfully and verification email has been sent on your email",
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/verify/{token}",
    params(("token" = String, Path, description = "Token from the verification email")),
    responses(
        (status = 200, description = "Email verified", body = EmailVerifiedResponse),
        (status = 400, description = "Token is invalid or expired", body = projex_core::ErrorBody)
    ),
    tag = "Users"
)]
#[instrument(skip(state, token))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<ApiResponse<EmailVerifiedResponse>, AppError> {
    UserService::verify_email(&state.db, &token).await?;

    Ok(ApiResponse::ok(
        EmailVerifiedResponse {
            is_email_verified: true,
        },
        "Email is verified",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; tokens also set as cookies", body = LoginResponse),
        (status = 401, description = "Incorrect email or password", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Users"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AppError> {
    let (user, tokens) = UserService::login(&state.db, &state.jwt_config, dto).await?;

    let jar = set_auth_cookies(
        jar,
        &tokens.access_token,
        &tokens.refresh_token,
        &state.jwt_config,
    );

    Ok((
        jar,
        ApiResponse::ok(
            LoginResponse {
                user,
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
            "User logged in successfully",
        ),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses(
        (status = 200, description = "Logged out; cookies cleared", body = Empty),
        (status = 401, description = "Unauthorized", body = projex_core::ErrorBody)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<Empty>), AppError> {
    UserService::logout(&state.db, auth_user.user_id()?).await?;

    Ok((
        clear_auth_cookies(jar),
        ApiResponse::ok(Empty {}, "User logged out"),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/refresh-access-token",
    request_body(content = RefreshTokenRequest, description = "Used when the refreshToken cookie is absent"),
    responses(
        (status = 200, description = "New token pair; also set as cookies", body = TokenPair),
        (status = 401, description = "Refresh token missing, invalid or already used", body = projex_core::ErrorBody)
    ),
    tag = "Users"
)]
#[instrument(skip(state, jar, body))]
pub async fn refresh_access_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiResponse<TokenPair>), AppError> {
    let from_body = || {
        serde_json::from_slice::<RefreshTokenRequest>(&body)
            .ok()
            .and_then(|req| req.refresh_token)
    };

    let incoming = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(from_body)
        .ok_or_else(|| AppError::unauthorized("Unauthorized request"))?;

    let (_, tokens) =
        UserService::refresh_tokens(&state.db, &state.jwt_config, &incoming).await?;
    metrics::track_tokens_refreshed();

    let jar = set_auth_cookies(
        jar,
        &tokens.access_token,
        &tokens.refresh_token,
        &state.jwt_config,
    );

    Ok((jar, ApiResponse::ok(tokens, "Access token refreshed")))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    responses(
        (status = 200, description = "The current user", body = User),
        (status = 401, description = "Unauthorized", body = projex_core::ErrorBody)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<User>, AppError> {
    let user = UserService::find_by_id(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok(user, "Current user fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/resend-email-verification",
    responses(
        (status = 200, description = "Verification email sent", body = Empty),
        (status = 401, description = "Unauthorized", body = projex_core::ErrorBody),
        (status = 409, description = "Email already verified", body = projex_core::ErrorBody)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn resend_email_verification(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Empty>, AppError> {
    let (user, token) =
        UserService::resend_email_verification(&state.db, auth_user.user_id()?).await?;

    let content = EmailService::new(state.email_config.clone())
        .verification_email(&user.username, &token.unhashed);
    deliver(&state, &user.email, content).await;

    Ok(ApiResponse::ok(Empty {}, "Mail has been sent to your mail ID"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset link sent if the account exists", body = Empty),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    if let Some((user, token)) = UserService::forgot_password(&state.db, &dto.email).await? {
        let content = EmailService::new(state.email_config.clone())
            .password_reset_email(&user.username, &token.unhashed);
        deliver(&state, &user.email, content).await;
    }

    Ok(ApiResponse::ok(
        Empty {},
        "If an account exists for this email, a password reset link has been sent",
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/reset-password/{token}",
    params(("token" = String, Path, description = "Token from the reset email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = Empty),
        (status = 400, description = "Token is invalid or expired", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Users"
)]
#[instrument(skip(state, token, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<ApiResponse<Empty>, AppError> {
    let user = UserService::reset_password(&state.db, &token, &dto.password).await?;

    let content = EmailService::new(state.email_config.clone()).password_changed_email(&user.username);
    deliver(&state, &user.email, content).await;

    Ok(ApiResponse::ok(Empty {}, "Password reset successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = Empty),
        (status = 400, description = "Old password is wrong", body = projex_core::ErrorBody),
        (status = 401, description = "Unauthorized", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Users",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<ApiResponse<Empty>, AppError> {
    UserService::change_password(&state.db, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::ok(Empty {}, "Password changed successfully"))
}
