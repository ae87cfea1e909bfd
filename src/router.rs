use std::sync::Arc;

use anyhow::anyhow;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_governor::GovernorLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use projex_core::AppError;
use projex_models::MAX_ATTACHMENTS;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::middleware::auth::require_auth;
use crate::modules::healthcheck::init_healthcheck_router;
use crate::modules::projects::init_projects_router;
use crate::modules::users::init_users_router;
use crate::state::AppState;

/// Room for the text fields of a multipart form on top of its files.
const FORM_FIELDS_ALLOWANCE: usize = 64 * 1024;

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

pub fn init_router(state: AppState) -> Router {
    let mut api = Router::new()
        .nest("/healthcheck", init_healthcheck_router())
        .nest("/users", init_users_router(&state))
        .nest(
            "/projects",
            init_projects_router()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
        )
        .fallback(|| async { AppError::not_found(anyhow!("Route not found")) });

    if state.rate_limit_config.enabled {
        api = api.layer(GovernorLayer::new(Arc::new(
            state.rate_limit_config.general_governor_config(),
        )));
    }

    let files = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .service(ServeDir::new(&state.storage_config.upload_dir));

    let body_limit = state.storage_config.max_file_size * (MAX_ATTACHMENTS + 1) + FORM_FIELDS_ALLOWANCE;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .nest("/api/v1", api)
        .nest_service("/files", files)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}
