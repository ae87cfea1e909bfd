use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use projex_core::serde::{trimmed, trimmed_optional};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubTask {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub is_completed: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubTaskDto {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 4, max = 50, message = "Title must be 4 to 50 characters"))]
    pub title: String,
}

/// Completion may be toggled by any member; renaming needs task write access.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubTaskDto {
    #[serde(default, deserialize_with = "trimmed_optional")]
    #[validate(length(min = 4, max = 50, message = "Title must be 4 to 50 characters"))]
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_subtask_camel_case() {
        let dto: UpdateSubTaskDto = serde_json::from_str(r#"{"isCompleted":true}"#).unwrap();
        assert_eq!(dto.is_completed, Some(true));
        assert!(dto.title.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_create_subtask_title_bounds() {
        assert!(CreateSubTaskDto { title: "abc".into() }.validate().is_err());
        assert!(CreateSubTaskDto { title: "abcd".into() }.validate().is_ok());
    }
}
