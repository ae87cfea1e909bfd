use axum::extract::{Path, State};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use projex_core::{ApiResponse, AppError};

use crate::middleware::permission::{RequireProjectRead, RequireTaskWrite};
use crate::modules::tasks::model::{
    CreateTaskDto, CreateTaskForm, Task, TaskDetail, TaskSummary, UpdateTaskDto,
};
use crate::modules::tasks::service::TaskService;
use crate::state::AppState;
use crate::utils::multipart::ValidatedMultipart;
use crate::validator::ValidatedJson;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskDeleted {
    pub deleted_subtasks: u64,
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/tasks",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Tasks with assignee and subtask progress", body = Vec<TaskSummary>),
        (status = 401, description = "Not a member", body = projex_core::ErrorBody)
    ),
    tag = "Tasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    RequireProjectRead(access): RequireProjectRead,
) -> Result<ApiResponse<Vec<TaskSummary>>, AppError> {
    let tasks = TaskService::list(&state.db, access.project_id).await?;
    Ok(ApiResponse::ok(tasks, "Tasks fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/tasks/{task_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task with assignee and subtasks", body = TaskDetail),
        (status = 401, description = "Not a member", body = projex_core::ErrorBody),
        (status = 404, description = "Task not found", body = projex_core::ErrorBody)
    ),
    tag = "Tasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    RequireProjectRead(access): RequireProjectRead,
    Path(ids): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse<TaskDetail>, AppError> {
    let (_, task_id) = ids;
    let task = TaskService::get(&state.db, access.project_id, task_id).await?;
    Ok(ApiResponse::ok(task, "Task fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/tasks",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body(content = CreateTaskForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 401, description = "Caller may not write tasks", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed, assignee not a member, or attachment rejected", body = projex_core::ErrorBody)
    ),
    tag = "Tasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, form))]
pub async fn create_task(
    State(state): State<AppState>,
    RequireTaskWrite(access): RequireTaskWrite,
    form: ValidatedMultipart<CreateTaskDto>,
) -> Result<ApiResponse<Task>, AppError> {
    let files: Vec<_> = form.files_named("attachments").cloned().collect();

    let task = TaskService::create(
        &state.db,
        state.storage.as_ref(),
        access.project_id,
        access.user_id,
        form.data,
        &files,
    )
    .await?;

    Ok(ApiResponse::created(task, "Task created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{project_id}/tasks/{task_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    request_body = UpdateTaskDto,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 401, description = "Caller may not write tasks", body = projex_core::ErrorBody),
        (status = 404, description = "Task not found", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed or assignee not a member", body = projex_core::ErrorBody)
    ),
    tag = "Tasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_task(
    State(state): State<AppState>,
    RequireTaskWrite(access): RequireTaskWrite,
    Path(ids): Path<(Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<UpdateTaskDto>,
) -> Result<ApiResponse<Task>, AppError> {
    let (_, task_id) = ids;
    let task = TaskService::update(&state.db, access.project_id, task_id, dto).await?;
    Ok(ApiResponse::ok(task, "Task updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}/tasks/{task_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("task_id" = Uuid, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task and its subtasks deleted", body = TaskDeleted),
        (status = 401, description = "Caller may not write tasks", body = projex_core::ErrorBody),
        (status = 404, description = "Task not found", body = projex_core::ErrorBody)
    ),
    tag = "Tasks",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    RequireTaskWrite(access): RequireTaskWrite,
    Path(ids): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse<TaskDeleted>, AppError> {
    let (_, task_id) = ids;
    let deleted_subtasks =
        TaskService::delete(&state.db, state.storage.as_ref(), access.project_id, task_id).await?;

    Ok(ApiResponse::ok(
        TaskDeleted { deleted_subtasks },
        "Task deleted successfully",
    ))
}
