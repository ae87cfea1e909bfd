//! Project-scoped authorization.
//!
//! Every nested route under `/projects/{project_id}` resolves the caller's
//! role with one query and passes it through [`authorize`]. Handlers declare
//! the action they need by taking one of the extractors generated below:
//!
//! ```ignore
//! async fn create_note(RequireNoteWrite(access): RequireNoteWrite, ...) { ... }
//! ```
//!
//! Any failure to authorize, including a failed lookup, is a 401.

use axum::{
    extract::{FromRequestParts, RawPathParams},
    http::request::Parts,
};
use sqlx::PgPool;
use tracing::{error, instrument};
use uuid::Uuid;

use projex_core::AppError;
use projex_models::ProjectRole;

use crate::metrics;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub const NOT_AUTHORIZED: &str = "You are not authorized to perform this action";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectAction {
    Read,
    WriteTasks,
    WriteNotes,
    Administer,
}

impl ProjectAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::WriteTasks => "write_tasks",
            Self::WriteNotes => "write_notes",
            Self::Administer => "administer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// The authorization policy: what a role may do within one project.
///
/// | role          | Read | WriteTasks | WriteNotes | Administer |
/// |---------------|------|------------|------------|------------|
/// | none          | no   | no         | no         | no         |
/// | member        | yes  | no         | no         | no         |
/// | project_admin | yes  | yes        | no         | no         |
/// | admin         | yes  | yes        | yes        | yes        |
pub fn authorize(role: Option<ProjectRole>, action: ProjectAction) -> Decision {
    let allowed = match (role, action) {
        (None, _) => false,
        (Some(_), ProjectAction::Read) => true,
        (Some(ProjectRole::Admin), _) => true,
        (Some(ProjectRole::ProjectAdmin), ProjectAction::WriteTasks) => true,
        (Some(_), _) => false,
    };

    if allowed { Decision::Allow } else { Decision::Deny }
}

#[instrument(skip(db), fields(db.operation = "SELECT", db.table = "project_members"))]
pub async fn find_project_role(
    db: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ProjectRole>, sqlx::Error> {
    sqlx::query_scalar::<_, ProjectRole>(
        "SELECT role FROM project_members WHERE project_id = $1 AND user_id = $2",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// The caller's resolved standing in the project named by the path.
#[derive(Debug, Clone)]
pub struct ProjectAccess {
    pub user: AuthUser,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role: ProjectRole,
}

impl ProjectAccess {
    pub fn can(&self, action: ProjectAction) -> bool {
        authorize(Some(self.role), action) == Decision::Allow
    }

    pub async fn resolve(
        parts: &mut Parts,
        state: &AppState,
        action: ProjectAction,
    ) -> Result<Self, AppError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let user_id = user.user_id()?;

        let params = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::unauthorized(NOT_AUTHORIZED))?;
        let project_id = params
            .iter()
            .find(|(key, _)| *key == "project_id")
            .and_then(|(_, value)| Uuid::parse_str(value).ok())
            .ok_or_else(|| AppError::unauthorized(NOT_AUTHORIZED))?;

        let role = find_project_role(&state.db, project_id, user_id)
            .await
            .map_err(|e| {
                error!(error = %e, project.id = %project_id, "Project role lookup failed");
                AppError::unauthorized(NOT_AUTHORIZED)
            })?;

        let decision = authorize(role, action);
        metrics::track_permission_decision(action.as_str(), decision == Decision::Allow);

        match (decision, role) {
            (Decision::Allow, Some(role)) => Ok(Self {
                user,
                user_id,
                project_id,
                role,
            }),
            _ => Err(AppError::unauthorized(NOT_AUTHORIZED)),
        }
    }
}

macro_rules! require_project_action {
    ($name:ident, $action:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub ProjectAccess);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                ProjectAccess::resolve(parts, state, $action).await.map($name)
            }
        }
    };
}

require_project_action!(RequireProjectRead, ProjectAction::Read);
require_project_action!(RequireTaskWrite, ProjectAction::WriteTasks);
require_project_action!(RequireNoteWrite, ProjectAction::WriteNotes);
require_project_action!(RequireProjectAdmin, ProjectAction::Administer);

#[cfg(test)]
mod tests {
    use super::*;

    const ACTIONS: [ProjectAction; 4] = [
        ProjectAction::Read,
        ProjectAction::WriteTasks,
        ProjectAction::WriteNotes,
        ProjectAction::Administer,
    ];

    fn allowed(role: Option<ProjectRole>) -> Vec<ProjectAction> {
        ACTIONS
            .into_iter()
            .filter(|a| authorize(role, *a) == Decision::Allow)
            .collect()
    }

    #[test]
    fn test_non_member_is_denied_everything() {
        assert!(allowed(None).is_empty());
    }

    #[test]
    fn test_member_can_only_read() {
        assert_eq!(allowed(Some(ProjectRole::Member)), vec![ProjectAction::Read]);
    }

    #[test]
    fn test_project_admin_can_write_tasks_but_not_notes() {
        assert_eq!(
            allowed(Some(ProjectRole::ProjectAdmin)),
            vec![ProjectAction::Read, ProjectAction::WriteTasks]
        );
    }

    #[test]
    fn test_admin_can_do_everything() {
        assert_eq!(allowed(Some(ProjectRole::Admin)), ACTIONS.to_vec());
    }

    #[test]
    fn test_project_access_can() {
        let access = ProjectAccess {
            user: AuthUser(projex_auth::Claims {
                sub: Uuid::new_v4().to_string(),
                email: "m@example.com".into(),
                username: "m".into(),
                exp: 0,
                iat: 0,
            }),
            user_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            role: ProjectRole::Member,
        };
        assert!(access.can(ProjectAction::Read));
        assert!(!access.can(ProjectAction::WriteTasks));
    }
}
