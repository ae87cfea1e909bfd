//! # ProjeX Models
//!
//! Database entities, request DTOs and response shapes for the ProjeX API.
//! JSON field names are camelCase on the wire.
//!
//! - [`users`]: users and registration
//! - [`auth`]: login, refresh and password reset
//! - [`projects`]: projects and [`ProjectRole`]
//! - [`members`]: project membership
//! - [`tasks`]: tasks and attachments
//! - [`subtasks`]: task checklists
//! - [`notes`]: project notes

pub mod auth;
pub mod members;
pub mod notes;
pub mod projects;
pub mod subtasks;
pub mod tasks;
pub mod users;

pub use auth::{
    Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, RefreshTokenClaims,
    RefreshTokenRequest, ResetPasswordRequest, TokenPair,
};
pub use members::{AddMemberDto, MemberWithUser, ProjectMember, UpdateMemberRoleDto};
pub use notes::{NoteDto, ProjectNote};
pub use projects::{
    CreateProjectDto, PaginatedProjectsResponse, Project, ProjectDeletionSummary, ProjectRole,
    ProjectWithRole, UpdateProjectDto,
};
pub use subtasks::{CreateSubTaskDto, SubTask, UpdateSubTaskDto};
pub use tasks::{
    Attachment, CreateTaskDto, MAX_ATTACHMENTS, Task, TaskDetail, TaskStatus, TaskSummary,
    UpdateTaskDto,
};
pub use users::{ChangePasswordDto, RegisterUserDto, User, UserSummary};
