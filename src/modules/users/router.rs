use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_governor::GovernorLayer;

use crate::middleware::auth::require_auth;
use crate::state::AppState;

use super::controller::{
    change_password, forgot_password, get_profile, login, logout, refresh_access_token, register,
    reset_password, resend_email_verification, verify_email,
};

pub fn init_users_router(state: &AppState) -> Router<AppState> {
    let mut credential_routes = Router::new()
        .route("/register", post(register))
        .route("/verify/{token}", get(verify_email))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password));

    if state.rate_limit_config.enabled {
        credential_routes = credential_routes.layer(GovernorLayer::new(Arc::new(
            state.rate_limit_config.auth_governor_config(),
        )));
    }

    let session_routes = Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(get_profile))
        .route("/resend-email-verification", post(resend_email_verification))
        .route("/change-password", post(change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/refresh-access-token", post(refresh_access_token))
        .merge(credential_routes)
        .merge(session_routes)
}
