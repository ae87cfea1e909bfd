use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use projex_core::AppError;

use crate::modules::notes::model::{NoteDto, ProjectNote};

/// Notes are always read with their author's username.
const NOTE_SELECT: &str = r#"SELECT n.id, n.project_id, n.created_by, u.username AS author_username,
       n.content, n.created_at, n.updated_at
FROM project_notes n
JOIN users u ON u.id = n.created_by"#;

fn note_not_found() -> AppError {
    AppError::not_found(anyhow!("Note not found"))
}

pub struct NoteService;

impl NoteService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "project_notes"))]
    pub async fn list(db: &PgPool, project_id: Uuid) -> Result<Vec<ProjectNote>, AppError> {
        let notes = sqlx::query_as::<_, ProjectNote>(&format!(
            "{NOTE_SELECT} WHERE n.project_id = $1 ORDER BY n.created_at DESC"
        ))
        .bind(project_id)
        .fetch_all(db)
        .await?;

        Ok(notes)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "project_notes"))]
    pub async fn get(db: &PgPool, project_id: Uuid, note_id: Uuid) -> Result<ProjectNote, AppError> {
        sqlx::query_as::<_, ProjectNote>(&format!(
            "{NOTE_SELECT} WHERE n.id = $1 AND n.project_id = $2"
        ))
        .bind(note_id)
        .bind(project_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(note_not_found)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "project_notes"))]
    pub async fn create(
        db: &PgPool,
        project_id: Uuid,
        author: Uuid,
        dto: NoteDto,
    ) -> Result<ProjectNote, AppError> {
        let note_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO project_notes (project_id, created_by, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(project_id)
        .bind(author)
        .bind(&dto.content)
        .fetch_one(db)
        .await?;

        info!(note.id = %note_id, project.id = %project_id, "Note created");
        Self::get(db, project_id, note_id).await
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "project_notes"))]
    pub async fn update(
        db: &PgPool,
        project_id: Uuid,
        note_id: Uuid,
        dto: NoteDto,
    ) -> Result<ProjectNote, AppError> {
        let updated = sqlx::query(
            "UPDATE project_notes SET content = $3, updated_at = NOW() WHERE id = $1 AND project_id = $2",
        )
        .bind(note_id)
        .bind(project_id)
        .bind(&dto.content)
        .execute(db)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(note_not_found());
        }

        Self::get(db, project_id, note_id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "project_notes"))]
    pub async fn delete(db: &PgPool, project_id: Uuid, note_id: Uuid) -> Result<(), AppError> {
        let deleted = sqlx::query("DELETE FROM project_notes WHERE id = $1 AND project_id = $2")
            .bind(note_id)
            .bind(project_id)
            .execute(db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(note_not_found());
        }

        Ok(())
    }
}
