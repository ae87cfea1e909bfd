use axum::extract::{Path, State};
use tracing::instrument;
use uuid::Uuid;

use projex_core::{ApiResponse, AppError, Empty};

use crate::middleware::permission::{
    NOT_AUTHORIZED, ProjectAction, RequireProjectRead, RequireTaskWrite,
};
use crate::modules::subtasks::model::{CreateSubTaskDto, SubTask, UpdateSubTaskDto};
use crate::modules::subtasks::service::SubTaskService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/tasks/{task_id}/subtasks",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = CreateSubTaskDto,
    responses(
        (status = 201, description = "Subtask created", body = SubTask),
        (status = 401, description = "Caller may not write tasks", body = projex_core::ErrorBody),
        (status = 404, description = "Task not found in this project", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Subtasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_subtask(
    State(state): State<AppState>,
    RequireTaskWrite(access): RequireTaskWrite,
    Path(ids): Path<(Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<CreateSubTaskDto>,
) -> Result<ApiResponse<SubTask>, AppError> {
    let (_, task_id) = ids;
    let subtask =
        SubTaskService::create(&state.db, access.project_id, task_id, access.user_id, dto).await?;
    Ok(ApiResponse::created(subtask, "Subtask created successfully"))
}

/// Any member may toggle completion. Renaming needs task write access.
#[utoipa::path(
    put,
    path = "/api/v1/projects/{project_id}/tasks/{task_id}/subtasks/{subtask_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID"),
        ("subtask_id" = Uuid, Path, description = "Subtask ID")
    ),
    request_body = UpdateSubTaskDto,
    responses(
        (status = 200, description = "Subtask updated", body = SubTask),
        (status = 401, description = "Not a member, or renaming without task write access", body = projex_core::ErrorBody),
        (status = 404, description = "Subtask not found", body = projex_core::ErrorBody)
    ),
    tag = "Subtasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_subtask(
    State(state): State<AppState>,
    RequireProjectRead(access): RequireProjectRead,
    Path(ids): Path<(Uuid, Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<UpdateSubTaskDto>,
) -> Result<ApiResponse<SubTask>, AppError> {
    let (_, task_id, subtask_id) = ids;
    if dto.title.is_some() && !access.can(ProjectAction::WriteTasks) {
        return Err(AppError::unauthorized(NOT_AUTHORIZED));
    }

    let subtask =
        SubTaskService::update(&state.db, access.project_id, task_id, subtask_id, dto).await?;
    Ok(ApiResponse::ok(subtask, "Subtask updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}/tasks/{task_id}/subtasks/{subtask_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID"),
        ("subtask_id" = Uuid, Path, description = "Subtask ID")
    ),
    responses(
        (status = 200, description = "Subtask deleted", body = Empty),
        (status = 401, description = "Caller may not write tasks", body = projex_core::ErrorBody),
        (status = 404, description = "Subtask not found", body = projex_core::ErrorBody)
    ),
    tag = "Subtasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_subtask(
    State(state): State<AppState>,
    RequireTaskWrite(access): RequireTaskWrite,
    Path(ids): Path<(Uuid, Uuid, Uuid)>,
) -> Result<ApiResponse<Empty>, AppError> {
    let (_, task_id, subtask_id) = ids;
    SubTaskService::delete(&state.db, access.project_id, task_id, subtask_id).await?;
    Ok(ApiResponse::ok(Empty {}, "Subtask deleted successfully"))
}
