use axum::extract::{Path, State};
use tracing::instrument;
use uuid::Uuid;

use projex_core::{ApiResponse, AppError, Empty};

use crate::middleware::permission::{RequireProjectAdmin, RequireProjectRead};
use crate::modules::members::model::{AddMemberDto, MemberWithUser, UpdateMemberRoleDto};
use crate::modules::members::service::MemberService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/v1/projects/{project_id}/members",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project members", body = Vec<MemberWithUser>),
        (status = 401, description = "Not a member", body = projex_core::ErrorBody)
    ),
    tag = "Members",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_members(
    State(state): State<AppState>,
    RequireProjectRead(access): RequireProjectRead,
) -> Result<ApiResponse<Vec<MemberWithUser>>, AppError> {
    let members = MemberService::list(&state.db, access.project_id).await?;
    Ok(ApiResponse::ok(members, "Project members fetched successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects/{project_id}/members",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    request_body = AddMemberDto,
    responses(
        (status = 201, description = "Member added", body = MemberWithUser),
        (status = 401, description = "Not a project admin", body = projex_core::ErrorBody),
        (status = 404, description = "No user with this email", body = projex_core::ErrorBody),
        (status = 409, description = "Already a member", body = projex_core::ErrorBody)
    ),
    tag = "Members",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn add_member(
    State(state): State<AppState>,
    RequireProjectAdmin(access): RequireProjectAdmin,
    ValidatedJson(dto): ValidatedJson<AddMemberDto>,
) -> Result<ApiResponse<MemberWithUser>, AppError> {
    let member = MemberService::add(&state.db, access.project_id, dto).await?;
    Ok(ApiResponse::created(member, "Member added successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{project_id}/members/{user_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    request_body = UpdateMemberRoleDto,
    responses(
        (status = 200, description = "Role updated", body = MemberWithUser),
        (status = 401, description = "Not a project admin", body = projex_core::ErrorBody),
        (status = 404, description = "Not a member", body = projex_core::ErrorBody),
        (status = 409, description = "Would leave the project without an admin", body = projex_core::ErrorBody)
    ),
    tag = "Members",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_member_role(
    State(state): State<AppState>,
    RequireProjectAdmin(access): RequireProjectAdmin,
    Path(ids): Path<(Uuid, Uuid)>,
    ValidatedJson(dto): ValidatedJson<UpdateMemberRoleDto>,
) -> Result<ApiResponse<MemberWithUser>, AppError> {
    let (_, user_id) = ids;
    let member =
        MemberService::update_role(&state.db, access.project_id, user_id, dto.role).await?;
    Ok(ApiResponse::ok(member, "Member role updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{project_id}/members/{user_id}",
    params(
        ("project_id" = Uuid, Path, description = "Project ID"),
        ("user_id" = Uuid, Path, description = "Member's user ID")
    ),
    responses(
        (status = 200, description = "Member removed", body = Empty),
        (status = 401, description = "Not a project admin", body = projex_core::ErrorBody),
        (status = 404, description = "Not a member", body = projex_core::ErrorBody),
        (status = 409, description = "Would leave the project without an admin", body = projex_core::ErrorBody)
    ),
    tag = "Members",
    security(("cookie_auth" = []))
)]
#[instrument(skip(state))]
pub async fn remove_member(
    State(state): State<AppState>,
    RequireProjectAdmin(access): RequireProjectAdmin,
    Path(ids): Path<(Uuid, Uuid)>,
) -> Result<ApiResponse<Empty>, AppError> {
    let (_, user_id) = ids;
    MemberService::remove(&state.db, access.project_id, user_id).await?;
    Ok(ApiResponse::ok(Empty {}, "Member removed successfully"))
}
