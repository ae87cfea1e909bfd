//! JWT claim structures.
//!
//! - [`Claims`]: access token, sent on every request
//! - [`RefreshTokenClaims`]: refresh token, persisted on the user row

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use projex_core::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthorized("Invalid access token"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenClaims {
    /// User ID
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    /// Unique token ID; two refresh tokens minted in the same second still differ.
    pub jti: String,
}

impl RefreshTokenClaims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::unauthorized("Invalid refresh token"))
    }
}
