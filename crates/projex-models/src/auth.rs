//! Login, token refresh and password reset DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use projex_core::serde::trimmed;

use crate::users::User;

pub use projex_auth::{Claims, RefreshTokenClaims};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Email is invalid"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "secret1")]
    pub password: String,
}

/// Both tokens are also set as httpOnly cookies; the body copy is for non-browser clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body fallback when the `refreshToken` cookie is absent.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[serde(alias = "newPassword")]
    #[validate(length(min = 6, max = 20, message = "Password must be 6 to 20 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_requires_valid_email() {
        let dto = LoginRequest {
            email: "nope".into(),
            password: "x".into(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_reset_password_accepts_either_field_name() {
        let a: ResetPasswordRequest =
            serde_json::from_str(r#"{"password":"secret1"}"#).unwrap();
        let b: ResetPasswordRequest =
            serde_json::from_str(r#"{"newPassword":"secret1"}"#).unwrap();
        assert_eq!(a.password, b.password);
    }

    #[test]
    fn test_refresh_request_body_is_optional() {
        let req: RefreshTokenRequest = serde_json::from_str("{}").unwrap();
        assert!(req.refresh_token.is_none());
    }
}
