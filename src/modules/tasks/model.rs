use utoipa::ToSchema;

pub use projex_models::{
    Attachment, CreateTaskDto, MAX_ATTACHMENTS, Task, TaskDetail, TaskStatus, TaskSummary,
    UpdateTaskDto, UserSummary,
};

/// Multipart body of `POST /projects/{project_id}/tasks`, for the API docs.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct CreateTaskForm {
    #[schema(example = "Write launch checklist")]
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: uuid::Uuid,
    pub status: Option<TaskStatus>,
    /// Up to five files.
    #[schema(value_type = Vec<String>, format = Binary)]
    pub attachments: Vec<Vec<u8>>,
}
