use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::ReportFormDto;
use crate::features::reports::models::{CreateReport, Report, ReportStatus};
use crate::shared::constants::MAX_REPORT_IMAGES;

const REPORT_COLUMNS: &str = r#"
    id, name, gender, report_type, breed, image_urls, location_text,
    latitude, longitude, status, user_id, user_email, user_name, user_photo_url,
    contact_info, created_at, updated_at
"#;

/// Owner-guarded actions, used in permission messages
#[derive(Debug, Clone, Copy)]
pub enum ReportAction {
    Edit,
    Delete,
    Update,
}

impl ReportAction {
    fn verb(self) -> &'static str {
        match self {
            ReportAction::Edit => "edit",
            ReportAction::Delete => "delete",
            ReportAction::Update => "update",
        }
    }
}

/// Only the submitter may change or remove a report
pub fn ensure_owner(report: &Report, user: &AuthenticatedUser, action: ReportAction) -> Result<()> {
    if user.owns(report.user_id.as_deref()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You do not have permission to {} this report.",
            action.verb()
        )))
    }
}

/// Photos dropped by an edit; every kept photo must already belong to the report
/// and be listed once
pub fn removed_images(current: &[String], keep: &[String]) -> Result<Vec<String>> {
    if let Some((_, repeated)) = keep
        .iter()
        .enumerate()
        .find(|(i, url)| keep[..*i].contains(*url))
    {
        return Err(AppError::InvalidFields(vec![format!(
            "image_urls: {} is listed more than once",
            repeated
        )]));
    }
    if let Some(unknown) = keep.iter().find(|url| !current.contains(url)) {
        return Err(AppError::InvalidFields(vec![format!(
            "image_urls: {} is not a photo of this report",
            unknown
        )]));
    }
    Ok(current
        .iter()
        .filter(|url| !keep.contains(url))
        .cloned()
        .collect())
}

/// Full edit, applied only while the row still has the photos the edit was based on
///
/// `$11` is the photo list read before the edit. If another request added or
/// removed photos in between, no row matches and nothing is written.
fn update_report_sql() -> String {
    format!(
        r#"
        UPDATE reports
        SET name = $2, gender = $3, report_type = $4, breed = $5, location_text = $6,
            latitude = $7, longitude = $8, contact_info = $9, image_urls = $10,
            updated_at = NOW()
        WHERE id = $1 AND image_urls = $11
        RETURNING {}
        "#,
        REPORT_COLUMNS
    )
}

fn concurrent_edit() -> AppError {
    AppError::Conflict(
        "This report was changed by another request. Reload it and try again.".to_string(),
    )
}

/// Service for report persistence
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every report, newest first
    pub async fn list_all(&self) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports ORDER BY created_at DESC NULLS LAST",
            REPORT_COLUMNS
        );
        sqlx::query_as::<_, Report>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports WHERE user_id = $1 ORDER BY created_at DESC NULLS LAST",
            REPORT_COLUMNS
        );
        sqlx::query_as::<_, Report>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports for user {}: {:?}", user_id, e);
                AppError::Database(e)
            })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);
        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    pub async fn create(&self, data: &CreateReport) -> Result<Report> {
        let sql = format!(
            r#"
            INSERT INTO reports (
                name, gender, report_type, breed, image_urls, location_text,
                latitude, longitude, user_id, user_email, user_name, user_photo_url, contact_info
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(&data.name)
            .bind(data.gender)
            .bind(&data.report_type)
            .bind(&data.breed)
            .bind(&data.image_urls)
            .bind(&data.location_text)
            .bind(data.latitude)
            .bind(data.longitude)
            .bind(&data.user_id)
            .bind(&data.user_email)
            .bind(&data.user_name)
            .bind(&data.user_photo_url)
            .bind(&data.contact_info)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Created report {} for user {}", report.id, data.user_id);
        Ok(report)
    }

    /// Replace the descriptive fields and the photo list
    ///
    /// Returns the updated report and the photos that were dropped, which the
    /// caller removes from storage.
    pub async fn update(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        form: &ReportFormDto,
        image_urls: &[String],
    ) -> Result<(Report, Vec<String>)> {
        let current = self.get_by_id(id).await?;
        ensure_owner(&current, user, ReportAction::Edit)?;
        let removed = removed_images(&current.image_urls, image_urls)?;

        let sql = update_report_sql();

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(&form.name)
            .bind(form.gender)
            .bind(&form.report_type)
            .bind(&form.breed)
            .bind(&form.location_text)
            .bind(form.latitude)
            .bind(form.longitude)
            .bind(&form.contact_info)
            .bind(image_urls)
            .bind(&current.image_urls)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| {
                tracing::warn!("Report {} changed while being edited", id);
                concurrent_edit()
            })?;

        tracing::info!("Updated report {}", id);
        Ok((report, removed))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        status: ReportStatus,
    ) -> Result<Report> {
        let current = self.get_by_id(id).await?;
        ensure_owner(&current, user, ReportAction::Update)?;

        let sql = format!(
            "UPDATE reports SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            REPORT_COLUMNS
        );
        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update status of report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!("Report {} status changed to {}", id, status);
        Ok(report)
    }

    /// Check that `additional` more photos fit on the report, before uploading them
    pub async fn ensure_room_for_images(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        additional: usize,
    ) -> Result<Report> {
        let current = self.get_by_id(id).await?;
        ensure_owner(&current, user, ReportAction::Edit)?;

        if current.image_urls.len() + additional > MAX_REPORT_IMAGES {
            return Err(AppError::InvalidFields(vec![format!(
                "images: A report can have at most {} photos ({} already attached)",
                MAX_REPORT_IMAGES,
                current.image_urls.len()
            )]));
        }
        Ok(current)
    }

    /// Append photo URLs, refusing to go past the per-report limit
    pub async fn append_images(&self, id: Uuid, urls: &[String]) -> Result<Report> {
        let sql = format!(
            r#"
            UPDATE reports
            SET image_urls = image_urls || $2, updated_at = NOW()
            WHERE id = $1 AND cardinality(image_urls) + cardinality($2::TEXT[]) <= $3
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(urls)
            .bind(MAX_REPORT_IMAGES as i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to append images to report {}: {:?}", id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| {
                AppError::InvalidFields(vec![format!(
                    "images: A report can have at most {} photos",
                    MAX_REPORT_IMAGES
                )])
            })
    }

    /// Delete the record; returns it so the caller can clean up its photos
    pub async fn delete(&self, id: Uuid, user: &AuthenticatedUser) -> Result<Report> {
        let current = self.get_by_id(id).await?;
        ensure_owner(&current, user, ReportAction::Delete)?;

        let result = sqlx::query("DELETE FROM reports WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(&user.sub)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete report {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        tracing::info!("Deleted report {}", id);
        Ok(current)
    }
}
