use anyhow::anyhow;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use projex_core::AppError;

use crate::modules::subtasks::model::{CreateSubTaskDto, SubTask, UpdateSubTaskDto};
use crate::modules::tasks::service::TaskService;

fn subtask_not_found() -> AppError {
    AppError::not_found(anyhow!("Subtask not found"))
}

pub struct SubTaskService;

impl SubTaskService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "subtasks"))]
    pub async fn create(
        db: &PgPool,
        project_id: Uuid,
        task_id: Uuid,
        created_by: Uuid,
        dto: CreateSubTaskDto,
    ) -> Result<SubTask, AppError> {
        TaskService::ensure_in_project(db, project_id, task_id).await?;

        let subtask = sqlx::query_as::<_, SubTask>(
            r#"INSERT INTO subtasks (task_id, title, created_by)
               VALUES ($1, $2, $3)
               RETURNING id, task_id, title, is_completed, created_by, created_at, updated_at"#,
        )
        .bind(task_id)
        .bind(&dto.title)
        .bind(created_by)
        .fetch_one(db)
        .await?;

        Ok(subtask)
    }

    /// Subtasks are addressed through their task and project, so an id from
    /// another project is simply not found.
    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "subtasks"))]
    pub async fn update(
        db: &PgPool,
        project_id: Uuid,
        task_id: Uuid,
        subtask_id: Uuid,
        dto: UpdateSubTaskDto,
    ) -> Result<SubTask, AppError> {
        sqlx::query_as::<_, SubTask>(
            r#"UPDATE subtasks s
               SET title = COALESCE($4, s.title),
                   is_completed = COALESCE($5, s.is_completed),
                   updated_at = NOW()
               FROM tasks t
               WHERE s.id = $1 AND s.task_id = $2 AND t.id = s.task_id AND t.project_id = $3
               RETURNING s.id, s.task_id, s.title, s.is_completed, s.created_by, s.created_at, s.updated_at"#,
        )
        .bind(subtask_id)
        .bind(task_id)
        .bind(project_id)
        .bind(&dto.title)
        .bind(dto.is_completed)
        .fetch_optional(db)
        .await?
        .ok_or_else(subtask_not_found)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "subtasks"))]
    pub async fn delete(
        db: &PgPool,
        project_id: Uuid,
        task_id: Uuid,
        subtask_id: Uuid,
    ) -> Result<(), AppError> {
        let deleted = sqlx::query(
            r#"DELETE FROM subtasks s
               USING tasks t
               WHERE s.id = $1 AND s.task_id = $2 AND t.id = s.task_id AND t.project_id = $3"#,
        )
        .bind(subtask_id)
        .bind(task_id)
        .bind(project_id)
        .execute(db)
        .await?
        .rows_affected();

        if deleted == 0 {
            return Err(subtask_not_found());
        }

        Ok(())
    }
}
