use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;
use uuid::Uuid;

use projex_auth::{Claims, verify_token};
use projex_core::AppError;

use crate::metrics;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::cookies::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, set_auth_cookies};

const UNAUTHORIZED_REQUEST: &str = "Unauthorized request";

/// The authenticated caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.0.user_id()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED_REQUEST))
    }
}

/// Access token from the cookie, falling back to an `Authorization: Bearer` header.
fn access_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    jar.get(ACCESS_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
        })
}

/// Authenticates the request.
///
/// A valid access token is accepted as is. Otherwise the `refreshToken`
/// cookie is exchanged for a new token pair, the new refresh token is
/// persisted, and both are set as cookies on the response.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = access_token(&jar, req.headers())
        && let Ok(claims) = verify_token(&token, &state.jwt_config)
    {
        req.extensions_mut().insert(AuthUser(claims));
        return Ok(next.run(req).await);
    }

    let refresh_token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED_REQUEST))?;

    let (user, tokens) =
        UserService::refresh_tokens(&state.db, &state.jwt_config, &refresh_token).await?;
    let claims = verify_token(&tokens.access_token, &state.jwt_config)?;

    debug!(user.id = %user.id, "Access token refreshed from cookie");
    metrics::track_tokens_refreshed();

    req.extensions_mut().insert(AuthUser(claims));
    let response = next.run(req).await;

    // A handler that set or cleared the auth cookies itself (logout) has the final word.
    if handler_set_auth_cookies(&response) {
        return Ok(response);
    }

    let jar = set_auth_cookies(jar, &tokens.access_token, &tokens.refresh_token, &state.jwt_config);
    Ok((jar, response).into_response())
}

fn handler_set_auth_cookies(response: &Response) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&format!("{ACCESS_TOKEN_COOKIE}=")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_access_token_prefers_cookie() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"));
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        assert_eq!(access_token(&jar, &headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_access_token_falls_back_to_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(
            access_token(&CookieJar::new(), &headers).as_deref(),
            Some("abc")
        );

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(access_token(&CookieJar::new(), &headers).is_none());
    }
}
