use anyhow::anyhow;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use projex_core::AppError;

use crate::modules::members::model::{AddMemberDto, MemberWithUser, ProjectRole};

const MEMBER_WITH_USER: &str = r#"
    SELECT u.id AS user_id, u.username, u.full_name, u.email, u.avatar_url,
           pm.role, pm.created_at AS joined_at
    FROM project_members pm
    JOIN users u ON u.id = pm.user_id"#;

fn already_member() -> AppError {
    AppError::conflict(anyhow!("User is already a member of this project"))
}

fn member_not_found() -> AppError {
    AppError::not_found(anyhow!("Project member not found"))
}

async fn fetch_member(
    conn: &mut PgConnection,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<MemberWithUser, AppError> {
    sqlx::query_as::<_, MemberWithUser>(&format!(
        "{MEMBER_WITH_USER} WHERE pm.project_id = $1 AND pm.user_id = $2"
    ))
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(member_not_found)
}

/// Serializes membership changes within one project. Taken before any
/// member row so concurrent role changes queue instead of deadlocking.
async fn lock_project(conn: &mut PgConnection, project_id: Uuid) -> Result<(), AppError> {
    sqlx::query("SELECT 1 FROM projects WHERE id = $1 FOR NO KEY UPDATE")
        .bind(project_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Locks the member row and returns its current role.
async fn lock_member_role(
    conn: &mut PgConnection,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<ProjectRole, AppError> {
    sqlx::query_scalar::<_, ProjectRole>(
        "SELECT role FROM project_members WHERE project_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(member_not_found)
}

/// Fails when the project has no admin other than the one being changed.
/// Callers hold the project lock.
async fn ensure_another_admin(conn: &mut PgConnection, project_id: Uuid) -> Result<(), AppError> {
    let admins = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM project_members WHERE project_id = $1 AND role = $2",
    )
    .bind(project_id)
    .bind(ProjectRole::Admin)
    .fetch_one(conn)
    .await?;

    if admins <= 1 {
        return Err(AppError::conflict(anyhow!(
            "A project must keep at least one admin"
        )));
    }

    Ok(())
}

pub struct MemberService;

impl MemberService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "project_members"))]
    pub async fn list(db: &PgPool, project_id: Uuid) -> Result<Vec<MemberWithUser>, AppError> {
        let members = sqlx::query_as::<_, MemberWithUser>(&format!(
            "{MEMBER_WITH_USER} WHERE pm.project_id = $1 ORDER BY pm.created_at"
        ))
        .bind(project_id)
        .fetch_all(db)
        .await?;

        Ok(members)
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "project_members"))]
    pub async fn add(
        db: &PgPool,
        project_id: Uuid,
        dto: AddMemberDto,
    ) -> Result<MemberWithUser, AppError> {
        let mut tx = db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(dto.email.to_lowercase())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User does not exist")))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(already_member());
        }

        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(project_id)
            .bind(user_id)
            .bind(dto.role)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e
                    && db_err.is_unique_violation()
                {
                    return already_member();
                }
                AppError::database(e)
            })?;

        let member = fetch_member(&mut tx, project_id, user_id).await?;
        tx.commit().await?;

        info!(project.id = %project_id, user.id = %user_id, role = %dto.role, "Member added");
        Ok(member)
    }

    #[instrument(skip(db), fields(db.operation = "UPDATE", db.table = "project_members"))]
    pub async fn update_role(
        db: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
        role: ProjectRole,
    ) -> Result<MemberWithUser, AppError> {
        let mut tx = db.begin().await?;

        lock_project(&mut tx, project_id).await?;
        let current = lock_member_role(&mut tx, project_id, user_id).await?;
        if current == ProjectRole::Admin && role != ProjectRole::Admin {
            ensure_another_admin(&mut tx, project_id).await?;
        }

        sqlx::query(
            "UPDATE project_members SET role = $3, updated_at = NOW() WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(role)
        .execute(&mut *tx)
        .await?;

        let member = fetch_member(&mut tx, project_id, user_id).await?;
        tx.commit().await?;

        info!(project.id = %project_id, user.id = %user_id, from = %current, to = %role, "Member role changed");
        Ok(member)
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "project_members"))]
    pub async fn remove(db: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        lock_project(&mut tx, project_id).await?;
        if lock_member_role(&mut tx, project_id, user_id).await? == ProjectRole::Admin {
            ensure_another_admin(&mut tx, project_id).await?;
        }

        sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(project.id = %project_id, user.id = %user_id, "Member removed");
        Ok(())
    }
}
