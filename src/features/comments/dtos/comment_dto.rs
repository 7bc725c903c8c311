use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::comments::models::Comment;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentResponseDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub user_photo_url: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponseDto {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            report_id: c.report_id,
            user_id: c.user_id,
            user_name: c.user_name,
            user_photo_url: c.user_photo_url,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    /// Comment text, 1-500 characters after trimming
    #[validate(length(min = 1, max = 500, message = "Comment must be between 1 and 500 characters"))]
    pub content: String,
}

impl CreateCommentDto {
    pub fn trimmed(self) -> Self {
        Self {
            content: self.content.trim().to_string(),
        }
    }
}
