use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use projex_config::JwtConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn auth_cookie(name: &'static str, value: String, config: &JwtConfig) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub fn set_auth_cookies(
    jar: CookieJar,
    access_token: &str,
    refresh_token: &str,
    config: &JwtConfig,
) -> CookieJar {
    jar.add(auth_cookie(ACCESS_TOKEN_COOKIE, access_token.to_string(), config))
        .add(auth_cookie(REFRESH_TOKEN_COOKIE, refresh_token.to_string(), config))
}

pub fn clear_auth_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/"))
        .remove(Cookie::build((REFRESH_TOKEN_COOKIE, "")).path("/"))
}
