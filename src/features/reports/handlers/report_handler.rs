use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    AddImagesForm, CreateReportForm, ImageUpload, ListReportsQuery, MyReportsQuery,
    MyReportsResponseDto, ReportFormDto, ReportListResponseDto, ReportResponseDto,
    UpdateReportDto, UpdateReportStatusDto,
};
use crate::features::reports::models::CreateReport;
use crate::features::reports::services::report_filter::{self, count_by_status};
use crate::features::reports::services::{ImageService, ReportService};
use crate::shared::constants::MAX_REPORT_IMAGES;
use crate::shared::types::{ApiResponse, Meta};

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub image_service: Arc<ImageService>,
}

/// Text fields and `images` parts of a report form
struct ReportMultipart {
    fields: HashMap<String, String>,
    images: Vec<ImageUpload>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<ReportMultipart> {
    let mut fields = HashMap::new();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "images" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unnamed".to_string());
            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read image bytes: {}", e);
                AppError::BadRequest(format!("Failed to read image data: {}", e))
            })?;

            images.push(ImageUpload {
                file_name,
                content_type,
                data: data.to_vec(),
            });
        } else if !name.is_empty() {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read field '{}': {}", name, e))
            })?;
            fields.insert(name, text);
        }
    }

    Ok(ReportMultipart { fields, images })
}

/// Count, type and size checks for a batch of new photos
fn check_images(images: &[ImageUpload], already_attached: usize) -> Vec<String> {
    let mut errors = Vec::new();
    if images.is_empty() {
        errors.push("images: At least one photo is required".to_string());
    } else if already_attached + images.len() > MAX_REPORT_IMAGES {
        errors.push(format!(
            "images: A report can have at most {} photos",
            MAX_REPORT_IMAGES
        ));
    }
    errors.extend(images.iter().filter_map(|image| image.check().err()));
    errors
}

/// Browse reports
///
/// Search, filter and sort every report. Always answers 200; if the reports
/// cannot be loaded the list is empty.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ListReportsQuery),
    responses(
        (status = 200, description = "Matching reports", body = ApiResponse<ReportListResponseDto>),
        (status = 400, description = "Unknown filter or sort value")
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(state): State<ReportState>,
    AppQuery(query): AppQuery<ListReportsQuery>,
) -> Result<Json<ApiResponse<ReportListResponseDto>>> {
    let criteria = query.into_criteria()?;

    let reports = state.report_service.list_all().await.unwrap_or_else(|e| {
        tracing::error!("Serving an empty report list, loading failed: {}", e);
        Vec::new()
    });

    let matching: Vec<ReportResponseDto> = report_filter::apply(&reports, &criteria)
        .into_iter()
        .map(ReportResponseDto::from)
        .collect();
    let total = matching.len();

    let dto = ReportListResponseDto {
        reports: matching,
        sort: criteria.sort,
        active_filter_count: criteria.filters.active_count(),
    };

    Ok(Json(ApiResponse::success(
        Some(dto),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get_by_id(id).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Submit a report
///
/// Accepts multipart/form-data with the report fields and 1-5 `images` parts.
/// Photos are uploaded first; if the record cannot be saved they are removed again.
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body(
        content = CreateReportForm,
        content_type = "multipart/form-data",
        description = "Report fields and photos",
    ),
    responses(
        (status = 201, description = "Report created", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let ReportMultipart { fields, images } = read_multipart(multipart).await?;

    let form = ReportFormDto::from_fields(&fields)?.normalized();
    let mut errors = match form.validate() {
        Ok(()) => Vec::new(),
        Err(e) => match AppError::from(e) {
            AppError::InvalidFields(errors) => errors,
            other => return Err(other),
        },
    };
    errors.extend(check_images(&images, 0));
    if !errors.is_empty() {
        return Err(AppError::InvalidFields(errors));
    }

    let image_urls = state.image_service.upload_all(&user.sub, &images).await?;

    let data = CreateReport {
        name: form.name,
        gender: form.gender,
        report_type: form.report_type,
        breed: form.breed,
        image_urls,
        location_text: form.location_text,
        latitude: form.latitude,
        longitude: form.longitude,
        user_id: user.sub.clone(),
        user_email: user.email.clone(),
        user_name: Some(user.display_name()),
        user_photo_url: user.picture.clone(),
        contact_info: form.contact_info,
    };

    match state.report_service.create(&data).await {
        Ok(report) => Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(report.into()),
                Some("Report submitted".to_string()),
                None,
            )),
        )),
        Err(e) => {
            state.image_service.delete_all(&data.image_urls).await;
            Err(e)
        }
    }
}

/// Edit a report
///
/// Replaces the descriptive fields. `image_urls` lists the photos to keep;
/// photos left out are deleted from storage.
#[utoipa::path(
    put,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportDto,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner of the report"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Photos changed by another request; reload and retry")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let UpdateReportDto { form, image_urls } = dto;
    let dto = UpdateReportDto {
        form: form.normalized(),
        image_urls,
    };
    dto.validate()?;

    let (report, removed) = state
        .report_service
        .update(id, &user, &dto.form, &dto.image_urls)
        .await?;

    if !removed.is_empty() {
        state.image_service.delete_all(&removed).await;
    }

    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report updated".to_string()),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner of the report"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state
        .report_service
        .update_status(id, &user, dto.status)
        .await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Attach more photos to a report, up to five in total
#[utoipa::path(
    post,
    path = "/api/reports/{id}/images",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body(
        content = AddImagesForm,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Photos added", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid photo or too many photos"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner of the report"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn add_report_images(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let ReportMultipart { images, .. } = read_multipart(multipart).await?;

    let current = state
        .report_service
        .ensure_room_for_images(id, &user, images.len())
        .await?;
    let errors = check_images(&images, current.image_urls.len());
    if !errors.is_empty() {
        return Err(AppError::InvalidFields(errors));
    }

    let urls = state.image_service.upload_all(&user.sub, &images).await?;
    match state.report_service.append_images(id, &urls).await {
        Ok(report) => Ok(Json(ApiResponse::success(Some(report.into()), None, None))),
        Err(e) => {
            state.image_service.delete_all(&urls).await;
            Err(e)
        }
    }
}

/// Delete a report
///
/// The record is removed first; photo deletion afterwards is best effort and
/// never fails the request.
#[utoipa::path(
    delete,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the owner of the report"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn delete_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    let report = state.report_service.delete(id, &user).await?;

    let summary = state.image_service.delete_all(&report.image_urls).await;
    if !summary.failed.is_empty() {
        tracing::warn!(
            "Report {} deleted, {} of {} photo(s) could not be removed",
            id,
            summary.failed.len(),
            report.image_urls.len()
        );
    }

    Ok(Json(ApiResponse::success(
        None,
        Some("Report deleted".to_string()),
        None,
    )))
}

/// The authenticated user's reports with per-status counts
#[utoipa::path(
    get,
    path = "/api/users/me/reports",
    params(MyReportsQuery),
    responses(
        (status = 200, description = "User's reports", body = ApiResponse<MyReportsResponseDto>),
        (status = 400, description = "Unknown status value"),
        (status = 401, description = "Authentication required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_my_reports(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    AppQuery(query): AppQuery<MyReportsQuery>,
) -> Result<Json<ApiResponse<MyReportsResponseDto>>> {
    let statuses = query.statuses()?;
    let reports = state.report_service.list_by_user(&user.sub).await?;

    let counts = count_by_status(&reports);
    let reports: Vec<ReportResponseDto> = reports
        .iter()
        .filter(|r| statuses.is_empty() || statuses.contains(&r.status))
        .map(ReportResponseDto::from)
        .collect();
    let total = reports.len();

    Ok(Json(ApiResponse::success(
        Some(MyReportsResponseDto { reports, counts }),
        None,
        Some(Meta::total(total)),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str) -> ImageUpload {
        ImageUpload {
            file_name: "oyen.jpg".to_string(),
            content_type: content_type.to_string(),
            data: vec![1],
        }
    }

    #[test]
    fn test_check_images_requires_one() {
        assert_eq!(
            check_images(&[], 0),
            vec!["images: At least one photo is required".to_string()]
        );
    }

    #[test]
    fn test_check_images_counts_attached_photos() {
        let three = vec![upload("image/jpeg"); 3];
        assert!(check_images(&three, 2).is_empty());
        assert_eq!(check_images(&three, 3).len(), 1);
        assert_eq!(check_images(&vec![upload("image/png"); 6], 0).len(), 1);
    }

    #[test]
    fn test_check_images_reports_each_bad_file() {
        let errors = check_images(&[upload("image/gif"), upload("text/plain")], 0);
        assert_eq!(errors.len(), 2);
    }
}
