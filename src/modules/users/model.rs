use serde::Serialize;
use utoipa::ToSchema;

pub use projex_models::{
    ChangePasswordDto, ForgotPasswordRequest, LoginRequest, LoginResponse, RefreshTokenRequest,
    RegisterUserDto, ResetPasswordRequest, TokenPair, User,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerifiedResponse {
    pub is_email_verified: bool,
}

/// Multipart body of `POST /users/register`, for the API docs.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct RegisterForm {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "ada")]
    pub username: String,
    pub password: String,
    #[schema(example = "Ada Lovelace")]
    pub fullname: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub avatar: Option<Vec<u8>>,
}
