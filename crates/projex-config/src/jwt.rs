use std::env;

/// Token signing and cookie settings.
///
/// Access and refresh tokens are signed with separate secrets so a leaked
/// access secret cannot be used to mint refresh tokens.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_token_secret: String,
    /// Seconds.
    pub access_token_expiry: i64,
    pub refresh_token_secret: String,
    /// Seconds.
    pub refresh_token_expiry: i64,
    /// Sets the `Secure` attribute on auth cookies.
    pub cookie_secure: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_token_secret: "access-secret-change-in-production".to_string(),
            access_token_expiry: 900,
            refresh_token_secret: "refresh-secret-change-in-production".to_string(),
            refresh_token_expiry: 864_000,
            cookie_secure: true,
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or(defaults.access_token_secret),
            access_token_expiry: env::var("ACCESS_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.access_token_expiry),
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .unwrap_or(defaults.refresh_token_secret),
            refresh_token_expiry: env::var("REFRESH_TOKEN_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.refresh_token_expiry),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.cookie_secure),
        }
    }
}
