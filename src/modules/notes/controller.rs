use axum::extract::{Path, State};
use tracing::instrument;
use uuid::Uuid;

use projex_core::{ApiResponse, AppError, Empty};

use crate::middleware::permission::{RequireNoteWrite, RequireProjectRead};
use crate::modules::notes::model::{NoteDto, ProjectNote};
use crate::modules::notes::service::NoteService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/notes",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project notes, newest first", body = Vec<ProjectNote>),
        (status = 401, description = "Not a member", body = projex_core::ErrorBody)
    ),
    tag = "Notes",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_notes(
    State(state): State<AppState>,
    RequireProjectRead(access): RequireProjectRead,
) -> Result<ApiResponse<Vec<ProjectNote>>, AppError> {
    let notes = NoteService::list(&state.db, access.project_id).await?;
    Ok(ApiResponse::ok(notes, "Project notes fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/notes/{note_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("note_id" = Uuid, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "The note", body = ProjectNote),
        (status = 401, description = "Not a member", body = projex_core::ErrorBody),
        (status = 404, description = "Note not found", body = projex_core::ErrorBody)
    ),
    tag = "Notes",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_note(
    State(state): State<AppState>,
    RequireProjectRead(access): RequireProjectRead,
    Path(ids): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse<ProjectNote>, AppError> {
    let (_, note_id) = ids;
    let note = NoteService::get(&state.db, access.project_id, note_id).await?;
    Ok(ApiResponse::ok(note, "Project note fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/notes",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = NoteDto,
    responses(
        (status = 201, description = "Note created", body = ProjectNote),
        (status = 401, description = "Only project admins may write notes", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Notes",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_note(
    State(state): State<AppState>,
    RequireNoteWrite(access): RequireNoteWrite,
    ValidatedJson(dto): ValidatedJson<NoteDto>,
) -> Result<ApiResponse<ProjectNote>, AppError> {
    let note = NoteService::create(&state.db, access.project_id, access.user_id, dto).await?;
    Ok(ApiResponse::created(note, "Note created successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{project_id}/notes/{note_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("note_id" = Uuid, Path, description = "Note ID")
    ),
    request_body = NoteDto,
    responses(
        (status = 200, description = "Note updated", body = ProjectNote),
        (status = 401, description = "Only project admins may write notes", body = projex_core::ErrorBody),
        (status = 404, description = "Note not found", body = projex_core::ErrorBody),
        (status = 422, description = "Validation failed", body = projex_core::ErrorBody)
    ),
    tag = "Notes",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_note(
    State(state): State<AppState>,
    RequireNoteWrite(access): RequireNoteWrite,
    Path(ids): Path<(Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<NoteDto>,
) -> Result<ApiResponse<ProjectNote>, AppError> {
    let (_, note_id) = ids;
    let note = NoteService::update(&state.db, access.project_id, note_id, dto).await?;
    Ok(ApiResponse::ok(note, "Note updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}/notes/{note_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("note_id" = Uuid, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted", body = Empty),
        (status = 401, description = "Only project admins may write notes", body = projex_core::ErrorBody),
        (status = 404, description = "Note not found", body = projex_core::ErrorBody)
    ),
    tag = "Notes",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_note(
    State(state): State<AppState>,
    RequireNoteWrite(access): RequireNoteWrite,
    Path(ids): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse<Empty>, AppError> {
    let (_, note_id) = ids;
    NoteService::delete(&state.db, access.project_id, note_id).await?;
    Ok(ApiResponse::ok(Empty {}, "Note deleted successfully"))
}
