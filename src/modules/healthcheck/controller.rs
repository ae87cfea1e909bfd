use axum::extract::State;

use projex_core::ApiResponse;

use crate::modules::healthcheck::model::HealthStatus;
use crate::modules::healthcheck::service::HealthService;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/healthcheck",
    responses((status = 200, description = "Service is running", body = HealthStatus)),
    tag = "Healthcheck"
)]
pub async fn healthcheck(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    ApiResponse::ok(HealthService::check(&state.db).await, "Health check passed")
}
