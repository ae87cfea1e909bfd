use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::healthcheck;

pub fn init_healthcheck_router() -> Router<AppState> {
    Router::new().route("/", get(healthcheck))
}
