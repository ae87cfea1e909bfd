use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use projex_core::{AppError, FileStorage, PaginationMeta, PaginationParams};

use crate::metrics;
use crate::modules::projects::model::{
    CreateProjectDto, PaginatedProjectsResponse, Project, ProjectDeletionSummary, ProjectRole,
    ProjectWithRole, UpdateProjectDto,
};
use crate::utils::uploads::discard_files;

const PROJECT_COLUMNS: &str = "id, name, description, created_by, created_at, updated_at";

const PROJECT_WITH_ROLE: &str = r#"
    SELECT p.id, p.name, p.description, p.created_by, pm.role,
           (SELECT COUNT(*) FROM project_members m WHERE m.project_id = p.id) AS member_count,
           p.created_at, p.updated_at
    FROM projects p
    JOIN project_members pm ON pm.project_id = p.id AND pm.user_id = $1"#;

fn name_taken(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::conflict(anyhow!("Project with this name already exists"));
    }
    AppError::database(e)
}

fn project_not_found() -> AppError {
    AppError::not_found(anyhow!("Project not found"))
}

pub struct ProjectService;

impl ProjectService {
    /// Projects the user belongs to, newest first, with their role and the member count.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "projects"))]
    pub async fn list_for_user(
        db: &PgPool,
        user_id: Uuid,
        params: PaginationParams,
    ) -> Result<PaginatedProjectsResponse, AppError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM project_members WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(db)
                .await?;

        let items = sqlx::query_as::<_, ProjectWithRole>(&format!(
            "{PROJECT_WITH_ROLE} ORDER BY p.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedProjectsResponse {
            items,
            meta: PaginationMeta::new(total, &params),
        })
    }

    /// Creates the project and makes the creator its admin in one transaction.
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "projects", project.name = %dto.name))]
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        dto: CreateProjectDto,
    ) -> Result<Project, AppError> {
        let mut tx = db.begin().await?;

        let project = sqlx::query_as::<_, Project>(&format!(
            "INSERT INTO projects (name, description, created_by) VALUES ($1, $2, $3) RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(name_taken)?;

        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(project.id)
            .bind(user_id)
            .bind(ProjectRole::Admin)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(project.id = %project.id, user.id = %user_id, "Project created");
        metrics::track_project_created();

        Ok(project)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "projects"))]
    pub async fn get_for_member(
        db: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<ProjectWithRole, AppError> {
        sqlx::query_as::<_, ProjectWithRole>(&format!("{PROJECT_WITH_ROLE} WHERE p.id = $2"))
            .bind(user_id)
            .bind(project_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(project_not_found)
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "projects"))]
    pub async fn update(
        db: &PgPool,
        project_id: Uuid,
        dto: UpdateProjectDto,
    ) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            r#"UPDATE projects
               SET name = COALESCE($2, name),
                   description = COALESCE($3, description),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {PROJECT_COLUMNS}"#
        ))
        .bind(project_id)
        .bind(dto.name.as_deref())
        .bind(&dto.description)
        .fetch_optional(db)
        .await
        .map_err(name_taken)?
        .ok_or_else(project_not_found)
    }

    /// Deletes the project and everything under it.
    ///
    /// Rows go in dependency order inside one transaction: subtasks, tasks,
    /// notes, members, then the project. Attachment files are removed after
    /// the commit.
    #[instrument(skip(db, storage), fields(db.operation = "DELETE", db.table = "projects"))]
    pub async fn delete(
        db: &PgPool,
        storage: &dyn FileStorage,
        project_id: Uuid,
    ) -> Result<ProjectDeletionSummary, AppError> {
        let mut tx = db.begin().await?;

        let attachment_keys = sqlx::query_scalar::<_, Vec<String>>(
            "SELECT attachment_keys FROM tasks WHERE project_id = $1",
        )
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await?;

        let subtasks = sqlx::query(
            "DELETE FROM subtasks WHERE task_id IN (SELECT id FROM tasks WHERE project_id = $1)",
        )
        .bind(project_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let tasks = sqlx::query("DELETE FROM tasks WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let notes = sqlx::query("DELETE FROM project_notes WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let members = sqlx::query("DELETE FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(project_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(project_not_found());
        }

        tx.commit().await?;

        let keys: Vec<&str> = attachment_keys.iter().flatten().map(String::as_str).collect();
        discard_files(storage, &keys).await;

        let summary = ProjectDeletionSummary {
            subtasks,
            tasks,
            notes,
            members,
        };

        info!(
            project.id = %project_id,
            deleted.subtasks = summary.subtasks,
            deleted.tasks = summary.tasks,
            deleted.notes = summary.notes,
            deleted.members = summary.members,
            "Project deleted"
        );
        metrics::track_project_deleted();

        Ok(summary)
    }
}
