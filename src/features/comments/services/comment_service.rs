use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::models::{Comment, CreateComment};

/// Service for report comments
pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Comments on a report, newest first
    pub async fn list_by_report(&self, report_id: Uuid) -> Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, report_id, user_id, user_name, user_photo_url, content, created_at
            FROM report_comments
            WHERE report_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list comments of report {}: {:?}", report_id, e);
            AppError::Database(e)
        })
    }

    /// Insert a comment; 404 when the report does not exist
    pub async fn create(&self, data: &CreateComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO report_comments (report_id, user_id, user_name, user_photo_url, content)
            SELECT $1, $2, $3, $4, $5
            WHERE EXISTS (SELECT 1 FROM reports WHERE id = $1)
            RETURNING id, report_id, user_id, user_name, user_photo_url, content, created_at
            "#,
        )
        .bind(data.report_id)
        .bind(&data.user_id)
        .bind(&data.user_name)
        .bind(&data.user_photo_url)
        .bind(&data.content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", data.report_id)))?;

        tracing::info!(
            "User {} commented on report {}",
            data.user_id,
            data.report_id
        );
        Ok(comment)
    }

    /// Delete a comment written by `user`
    pub async fn delete(
        &self,
        report_id: Uuid,
        comment_id: Uuid,
        user: &AuthenticatedUser,
    ) -> Result<()> {
        let author = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM report_comments WHERE id = $1 AND report_id = $2",
        )
        .bind(comment_id)
        .bind(report_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get comment {}: {:?}", comment_id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", comment_id)))?;

        if !user.owns(Some(&author)) {
            return Err(AppError::Forbidden(
                "You do not have permission to delete this comment.".to_string(),
            ));
        }

        sqlx::query("DELETE FROM report_comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete comment {}: {:?}", comment_id, e);
                AppError::Database(e)
            })?;

        tracing::info!("Deleted comment {} on report {}", comment_id, report_id);
        Ok(())
    }
}
