use axum::extract::{Query, State};
use tracing::instrument;
use uuid::Uuid;

use projex_core::{ApiResponse, AppError, PaginationParams};

use crate::middleware::auth::AuthUser;
use crate::middleware::permission::{RequireProjectAdmin, RequireProjectRead};
use crate::modules::projects::model::{
    CreateProjectDto, PaginatedProjectsResponse, Project, ProjectDeletionSummary,
    ProjectWithRole, UpdateProjectDto,
};
use crate::modules::projects::service::ProjectService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(PaginationParams),
    responses(
        (status = 200, description = "Projects the caller belongs to", body = PaginatedProjectsResponse),
        (status = 401, description = "Unauthorized", body = projex_core::ErrorBody)
    ),
    tag = "Projects",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_projects(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<ApiResponse<PaginatedProjectsResponse>, AppError> {
    let projects = ProjectService::list_for_user(&state.db, auth_user.user_id()?, params).await?;
    Ok(ApiResponse::ok(projects, "Projects fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectDto,
    responses(
        (status = 201, description = "Project created; caller is its admin", body = Project),
        (status = 401, description = "Unauthorized", body = projex_core::ErrorBody),
        (status = 409, description = "Project name taken", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Projects",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_project(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateProjectDto>,
) -> Result<ApiResponse<Project>, AppError> {
    let project = ProjectService::create(&state.db, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::created(project, "Project created successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "The project with the caller's role", body = ProjectWithRole),
        (status = 401, description = "Not a member", body = projex_core::ErrorBody)
    ),
    tag = "Projects",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    RequireProjectRead(access): RequireProjectRead,
) -> Result<ApiResponse<ProjectWithRole>, AppError> {
    let project =
        ProjectService::get_for_member(&state.db, access.project_id, access.user_id).await?;
    Ok(ApiResponse::ok(project, "Project fetched successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectDto,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 401, description = "Not a project admin", body = projex_core::ErrorBody),
        (status = 409, description = "Project name taken", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Projects",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_project(
    State(state): State<AppState>,
    RequireProjectAdmin(access): RequireProjectAdmin,
    ValidatedJson(dto): ValidatedJson<UpdateProjectDto>,
) -> Result<ApiResponse<Project>, AppError> {
    let project = ProjectService::update(&state.db, access.project_id, dto).await?;
    Ok(ApiResponse::ok(project, "Project updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project and everything under it deleted", body = ProjectDeletionSummary),
        (status = 401, description = "Not a project admin", body = projex_core::ErrorBody)
    ),
    tag = "Projects",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_project(
    State(state): State<AppState>,
    RequireProjectAdmin(access): RequireProjectAdmin,
) -> Result<ApiResponse<ProjectDeletionSummary>, AppError> {
    let summary =
        ProjectService::delete(&state.db, state.storage.as_ref(), access.project_id).await?;
    Ok(ApiResponse::ok(summary, "Project deleted successfully"))
}
