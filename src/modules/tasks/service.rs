use anyhow::anyhow;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, instrument};
use uuid::Uuid;

use projex_core::file_storage::ATTACHMENT_MIME_TYPES;
use projex_core::{AppError, FieldError, FileStorage};
use projex_models::SubTask;

use crate::metrics;
use crate::middleware::permission::find_project_role;
use crate::modules::tasks::model::{
    Attachment, CreateTaskDto, MAX_ATTACHMENTS, Task, TaskDetail, TaskSummary, UpdateTaskDto,
    UserSummary,
};
use crate::utils::multipart::UploadedFile;
use crate::utils::uploads::{StoredFile, discard_files, store_upload};

const TASK_COLUMNS: &str = "id, project_id, title, description, assigned_to, assigned_by, status, attachments, created_at, updated_at";

fn task_not_found() -> AppError {
    AppError::not_found(anyhow!("Task not found"))
}

/// Tasks can only be assigned to members of their project.
async fn ensure_assignable(db: &PgPool, project_id: Uuid, assignee: Uuid) -> Result<(), AppError> {
    if find_project_role(db, project_id, assignee).await?.is_none() {
        return Err(
            AppError::unprocessable(anyhow!("Assignee must be a member of this project"))
                .with_errors(vec![FieldError::new(
                    "assignedTo",
                    "Assignee must be a member of this project",
                )]),
        );
    }
    Ok(())
}

pub struct TaskService;

impl TaskService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "tasks"))]
    pub async fn list(db: &PgPool, project_id: Uuid) -> Result<Vec<TaskSummary>, AppError> {
        let tasks = sqlx::query_as::<_, TaskSummary>(
            r#"SELECT t.id, t.title, t.status, t.assigned_to,
                      u.username AS assignee_username,
                      COUNT(s.id) AS subtask_count,
                      COUNT(s.id) FILTER (WHERE s.is_completed) AS completed_subtask_count,
                      t.created_at
               FROM tasks t
               JOIN users u ON u.id = t.assigned_to
               LEFT JOIN subtasks s ON s.task_id = t.id
               WHERE t.project_id = $1
               GROUP BY t.id, u.username
               ORDER BY t.created_at DESC"#,
        )
        .bind(project_id)
        .fetch_all(db)
        .await?;

        Ok(tasks)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "tasks"))]
    pub async fn get(db: &PgPool, project_id: Uuid, task_id: Uuid) -> Result<TaskDetail, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND project_id = $2"
        ))
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(task_not_found)?;

        let assignee = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, full_name, email, avatar_url FROM users WHERE id = $1",
        )
        .bind(task.assigned_to)
        .fetch_one(db)
        .await?;

        let subtasks = sqlx::query_as::<_, SubTask>(
            r#"SELECT id, task_id, title, is_completed, created_by, created_at, updated_at
               FROM subtasks WHERE task_id = $1 ORDER BY created_at"#,
        )
        .bind(task.id)
        .fetch_all(db)
        .await?;

        Ok(TaskDetail {
            task,
            assignee,
            subtasks,
        })
    }

    /// 404 unless the task exists and belongs to the project.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "tasks"))]
    pub async fn ensure_in_project(
        db: &PgPool,
        project_id: Uuid,
        task_id: Uuid,
    ) -> Result<(), AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND project_id = $2)",
        )
        .bind(task_id)
        .bind(project_id)
        .fetch_one(db)
        .await?;

        if exists { Ok(()) } else { Err(task_not_found()) }
    }

    /// Stores the attachments, then inserts the task. Stored files are removed
    /// again if anything after the upload fails.
    #[instrument(
        skip(db, storage, dto, files),
        fields(db.operation = "INSERT", db.table = "tasks", attachments = files.len())
    )]
    pub async fn create(
        db: &PgPool,
        storage: &dyn FileStorage,
        project_id: Uuid,
        assigned_by: Uuid,
        dto: CreateTaskDto,
        files: &[UploadedFile],
    ) -> Result<Task, AppError> {
        if files.len() > MAX_ATTACHMENTS {
            return Err(AppError::unprocessable(anyhow!(
                "A task can have at most {} attachments",
                MAX_ATTACHMENTS
            ))
            .with_errors(vec![FieldError::new(
                "attachments",
                format!("At most {} files are allowed", MAX_ATTACHMENTS),
            )]));
        }

        ensure_assignable(db, project_id, dto.assigned_to).await?;

        let prefix = format!("tasks/{}", project_id);
        let mut stored: Vec<StoredFile> = Vec::with_capacity(files.len());
        for file in files {
            match store_upload(storage, &prefix, file, ATTACHMENT_MIME_TYPES).await {
                Ok(s) => stored.push(s),
                Err(e) => {
                    let keys: Vec<&str> = stored.iter().map(|s| s.key.as_str()).collect();
                    discard_files(storage, &keys).await;
                    return Err(e);
                }
            }
        }

        let attachments: Vec<Attachment> = stored
            .iter()
            .map(|s| Attachment {
                url: s.url.clone(),
                mimetype: s.mimetype.clone(),
                size: s.size as u64,
            })
            .collect();
        let attachment_keys: Vec<&str> = stored.iter().map(|s| s.key.as_str()).collect();

        let inserted = async {
            let mut tx = db.begin().await?;
            let task = sqlx::query_as::<_, Task>(&format!(
                r#"INSERT INTO tasks (project_id, title, description, assigned_to, assigned_by, status, attachments, attachment_keys)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                   RETURNING {TASK_COLUMNS}"#
            ))
            .bind(project_id)
            .bind(&dto.title)
            .bind(&dto.description)
            .bind(dto.assigned_to)
            .bind(assigned_by)
            .bind(dto.status)
            .bind(Json(&attachments))
            .bind(&attachment_keys)
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok::<_, sqlx::Error>(task)
        }
        .await;

        let task = match inserted {
            Ok(task) => task,
            Err(e) => {
                discard_files(storage, &attachment_keys).await;
                return Err(AppError::database(e));
            }
        };

        info!(task.id = %task.id, project.id = %project_id, "Task created");
        metrics::track_task_created(attachments.len());

        Ok(task)
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "tasks"))]
    pub async fn update(
        db: &PgPool,
        project_id: Uuid,
        task_id: Uuid,
        dto: UpdateTaskDto,
    ) -> Result<Task, AppError> {
        if let Some(assignee) = dto.assigned_to {
            ensure_assignable(db, project_id, assignee).await?;
        }

        sqlx::query_as::<_, Task>(&format!(
            r#"UPDATE tasks
               SET title = COALESCE($3, title),
                   description = COALESCE($4, description),
                   assigned_to = COALESCE($5, assigned_to),
                   status = COALESCE($6, status),
                   updated_at = NOW()
               WHERE id = $1 AND project_id = $2
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(task_id)
        .bind(project_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.assigned_to)
        .bind(dto.status)
        .fetch_optional(db)
        .await?
        .ok_or_else(task_not_found)
    }

    /// Deletes the task and its subtasks in one transaction, then its files.
    /// Returns the number of subtasks removed.
    #[instrument(skip(db, storage), fields(db.operation = "DELETE", db.table = "tasks"))]
    pub async fn delete(
        db: &PgPool,
        storage: &dyn FileStorage,
        project_id: Uuid,
        task_id: Uuid,
    ) -> Result<u64, AppError> {
        let mut tx = db.begin().await?;

        let attachment_keys = sqlx::query_scalar::<_, Vec<String>>(
            "SELECT attachment_keys FROM tasks WHERE id = $1 AND project_id = $2 FOR UPDATE",
        )
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(task_not_found)?;

        let subtasks = sqlx::query("DELETE FROM subtasks WHERE task_id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let keys: Vec<&str> = attachment_keys.iter().map(String::as_str).collect();
        discard_files(storage, &keys).await;

        info!(task.id = %task_id, deleted.subtasks = subtasks, "Task deleted");
        Ok(subtasks)
    }
}
