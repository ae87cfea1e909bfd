//! Project membership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use projex_core::serde::trimmed;

use crate::projects::ProjectRole;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMember {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub role: ProjectRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership joined with the member's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberWithUser {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: ProjectRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddMemberDto {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email(message = "Email is invalid"))]
    #[schema(example = "grace@example.com")]
    pub email: String,
    #[serde(default)]
    pub role: ProjectRole,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberRoleDto {
    pub role: ProjectRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_member_defaults_to_member_role() {
        let dto: AddMemberDto = serde_json::from_str(r#"{"email":"g@example.com"}"#).unwrap();
        assert_eq!(dto.role, ProjectRole::Member);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_add_member_rejects_unknown_role() {
        let res = serde_json::from_str::<AddMemberDto>(r#"{"email":"g@example.com","role":"owner"}"#);
        assert!(res.is_err());
    }
}
