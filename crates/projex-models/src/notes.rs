use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use projex_core::serde::trimmed;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNote {
    pub id: Uuid,
    pub project_id: Uuid,
    pub created_by: Uuid,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NoteDto {
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 4, max = 500, message = "Content must be 4 to 500 characters"))]
    #[schema(example = "Kickoff moved to Thursday")]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_content_bounds() {
        assert!(NoteDto { content: "hey".into() }.validate().is_err());
        assert!(NoteDto { content: "hey!".into() }.validate().is_ok());
        assert!(NoteDto { content: "x".repeat(501) }.validate().is_err());
    }
}
