use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use projex_core::{Empty, ErrorBody, PaginationMeta, PaginationParams};
use projex_models::{
    AddMemberDto, Attachment, ChangePasswordDto, CreateProjectDto, CreateSubTaskDto,
    CreateTaskDto, ForgotPasswordRequest, LoginRequest, LoginResponse, MemberWithUser, NoteDto,
    PaginatedProjectsResponse, Project, ProjectDeletionSummary, ProjectNote, ProjectRole,
    ProjectWithRole, RefreshTokenRequest, RegisterUserDto, ResetPasswordRequest, SubTask, Task,
    TaskDetail, TaskStatus, TaskSummary, TokenPair, UpdateMemberRoleDto, UpdateProjectDto,
    UpdateSubTaskDto, UpdateTaskDto, User, UserSummary,
};

use crate::modules::healthcheck::model::{DatabaseStatus, HealthStatus};
use crate::modules::tasks::controller::TaskDeleted;
use crate::modules::tasks::model::CreateTaskForm;
use crate::modules::users::model::{EmailVerifiedResponse, RegisterForm};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::healthcheck::controller::healthcheck,
        crate::modules::users::controller::register,
        crate::modules::users::controller::verify_email,
        crate::modules::users::controller::login,
        crate::modules::users::controller::logout,
        crate::modules::users::controller::refresh_access_token,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::resend_email_verification,
        crate::modules::users::controller::forgot_password,
        crate::modules::users::controller::reset_password,
        crate::modules::users::controller::change_password,
        crate::modules::projects::controller::list_projects,
        crate::modules::projects::controller::create_project,
        crate::modules::projects::controller::get_project,
        crate::modules::projects::controller::update_project,
        crate::modules::projects::controller::delete_project,
        crate::modules::members::controller::list_members,
        crate::modules::members::controller::add_member,
        crate::modules::members::controller::update_member_role,
        crate::modules::members::controller::remove_member,
        crate::modules::tasks::controller::list_tasks,
        crate::modules::tasks::controller::get_task,
        crate::modules::tasks::controller::create_task,
        crate::modules::tasks::controller::update_task,
        crate::modules::tasks::controller::delete_task,
        crate::modules::subtasks::controller::create_subtask,
        crate::modules::subtasks::controller::update_subtask,
        crate::modules::subtasks::controller::delete_subtask,
        crate::modules::notes::controller::list_notes,
        crate::modules::notes::controller::get_note,
        crate::modules::notes::controller::create_note,
        crate::modules::notes::controller::update_note,
        crate::modules::notes::controller::delete_note,
    ),
    components(
        schemas(
            ErrorBody,
            Empty,
            PaginationMeta,
            PaginationParams,
            HealthStatus,
            DatabaseStatus,
            User,
            UserSummary,
            RegisterUserDto,
            RegisterForm,
            EmailVerifiedResponse,
            LoginRequest,
            LoginResponse,
            TokenPair,
            RefreshTokenRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ChangePasswordDto,
            Project,
            ProjectRole,
            ProjectWithRole,
            CreateProjectDto,
            UpdateProjectDto,
            PaginatedProjectsResponse,
            ProjectDeletionSummary,
            MemberWithUser,
            AddMemberDto,
            UpdateMemberRoleDto,
            Task,
            TaskStatus,
            TaskSummary,
            TaskDetail,
            Attachment,
            CreateTaskDto,
            CreateTaskForm,
            UpdateTaskDto,
            TaskDeleted,
            SubTask,
            CreateSubTaskDto,
            UpdateSubTaskDto,
            ProjectNote,
            NoteDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Healthcheck", description = "Service liveness"),
        (name = "Users", description = "Registration, sessions and account recovery"),
        (name = "Projects", description = "Projects the caller belongs to"),
        (name = "Members", description = "Project membership and roles"),
        (name = "Tasks", description = "Project tasks and attachments"),
        (name = "Subtasks", description = "Task checklists"),
        (name = "Notes", description = "Project notes")
    ),
    info(
        title = "ProjeX API",
        version = "0.1.0",
        description = "Project management REST API built with Rust, Axum and PostgreSQL. Sessions use httpOnly JWT cookies.",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("accessToken"))),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_nested_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/healthcheck",
            "/api/v1/users/login",
            "/api/v1/projects/{project_id}/members/{user_id}",
            "/api/v1/projects/{project_id}/tasks/{task_id}/subtasks/{subtask_id}",
            "/api/v1/projects/{project_id}/notes/{note_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }

    #[test]
    fn test_openapi_has_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("cookie_auth"));
    }
}
