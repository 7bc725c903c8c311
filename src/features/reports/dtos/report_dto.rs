use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::reports::models::{CatGender, Report, ReportStatus};
use crate::features::reports::services::report_filter::{
    normalize_report_type, ReportCriteria, ReportFilters, SortOption, StatusCounts,
};
use crate::shared::constants::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE};
use crate::shared::validation::{normalize_line, validate_image_urls};

/// Public view of a report
///
/// The submitter's email is never exposed; `contact_info` is what they chose to share.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub name: String,
    pub gender: CatGender,
    #[serde(rename = "type")]
    pub report_type: String,
    pub breed: String,
    pub image_urls: Vec<String>,
    pub location_text: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: ReportStatus,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_photo_url: Option<String>,
    pub contact_info: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Report> for ReportResponseDto {
    fn from(r: &Report) -> Self {
        Self {
            id: r.id,
            name: r.name.clone(),
            gender: r.gender,
            report_type: r.report_type.clone(),
            breed: r.breed.clone(),
            image_urls: r.image_urls.clone(),
            location_text: r.location_text.clone(),
            latitude: r.latitude,
            longitude: r.longitude,
            status: r.status,
            user_id: r.user_id.clone(),
            user_name: r.user_name.clone(),
            user_photo_url: r.user_photo_url.clone(),
            contact_info: r.contact_info.clone(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self::from(&r)
    }
}

/// Browse result with the applied criteria echoed back
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportListResponseDto {
    pub reports: Vec<ReportResponseDto>,
    pub sort: SortOption,
    /// Number of selected filter values, for the "Filter (n)" badge
    pub active_filter_count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyReportsResponseDto {
    pub reports: Vec<ReportResponseDto>,
    /// Counts over all of the user's reports, before the status filter
    pub counts: StatusCounts,
}

/// Query string of the report browser
///
/// Multi-valued filters are comma separated: `?status=active,found&type=Hilang`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListReportsQuery {
    /// Free-text search over name, breed, location and type
    pub q: Option<String>,
    /// active, found, closed
    pub status: Option<String>,
    /// male, female, unknown
    pub gender: Option<String>,
    /// e.g. Hilang, Ditemukan (lost/found accepted)
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    /// newest (default), oldest, name-asc, name-desc
    pub sort: Option<String>,
}

fn split_values(raw: &Option<String>) -> impl Iterator<Item = &str> {
    raw.as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl ListReportsQuery {
    /// Parse into criteria, reporting every bad value at once
    pub fn into_criteria(self) -> Result<ReportCriteria, AppError> {
        let mut errors = Vec::new();
        let mut filters = ReportFilters::default();

        for value in split_values(&self.status) {
            match value.parse::<ReportStatus>() {
                Ok(status) => {
                    filters.status.insert(status);
                }
                Err(e) => errors.push(format!("status: {}", e)),
            }
        }
        for value in split_values(&self.gender) {
            match value.parse::<CatGender>() {
                Ok(gender) => {
                    filters.gender.insert(gender);
                }
                Err(e) => errors.push(format!("gender: {}", e)),
            }
        }
        filters.report_type = split_values(&self.report_type)
            .map(normalize_report_type)
            .collect();

        let sort = match self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => SortOption::default(),
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                errors.push(format!("sort: {}", e));
                SortOption::default()
            }),
        };

        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        Ok(ReportCriteria {
            query: self.q.as_deref().map(str::trim).unwrap_or("").to_string(),
            filters,
            sort,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MyReportsQuery {
    /// Comma separated statuses; empty for all
    pub status: Option<String>,
}

impl MyReportsQuery {
    pub fn statuses(&self) -> Result<Vec<ReportStatus>, AppError> {
        let mut errors = Vec::new();
        let mut out = Vec::new();
        for value in split_values(&self.status) {
            match value.parse::<ReportStatus>() {
                Ok(status) => out.push(status),
                Err(e) => errors.push(format!("status: {}", e)),
            }
        }
        if errors.is_empty() {
            Ok(out)
        } else {
            Err(AppError::InvalidFields(errors))
        }
    }
}

/// Descriptive fields of a report, shared by create and edit
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct ReportFormDto {
    #[validate(length(min = 1, max = 100, message = "Name is required (max 100 characters)"))]
    pub name: String,

    pub gender: CatGender,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type is required (max 50 characters)"))]
    pub report_type: String,

    #[validate(length(min = 1, max = 100, message = "Breed is required (max 100 characters)"))]
    pub breed: String,

    #[validate(length(min = 1, max = 300, message = "Location is required (max 300 characters)"))]
    pub location_text: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,

    #[validate(length(max = 200, message = "Contact info must not exceed 200 characters"))]
    pub contact_info: Option<String>,
}

impl ReportFormDto {
    /// Trim and collapse whitespace; blank contact info becomes `None`
    pub fn normalized(self) -> Self {
        Self {
            name: normalize_line(&self.name),
            report_type: normalize_report_type(&normalize_line(&self.report_type)),
            breed: normalize_line(&self.breed),
            location_text: normalize_line(&self.location_text),
            contact_info: self
                .contact_info
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            ..self
        }
    }

    /// Build from multipart text fields, collecting every missing or malformed field
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        let text = |key: &str| fields.get(key).cloned().unwrap_or_default();

        let gender = match fields.get("gender") {
            None => {
                errors.push("gender: Gender is required".to_string());
                CatGender::default()
            }
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                errors.push(format!("gender: {}", e));
                CatGender::default()
            }),
        };

        let mut coordinate = |key: &str| match fields.get(key).map(|v| v.trim().parse::<f64>()) {
            Some(Ok(value)) if value.is_finite() => value,
            Some(_) => {
                errors.push(format!("{}: {} must be a number", key, capitalize(key)));
                0.0
            }
            None => {
                errors.push(format!("{}: {} is required", key, capitalize(key)));
                0.0
            }
        };
        let latitude = coordinate("latitude");
        let longitude = coordinate("longitude");

        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        Ok(Self {
            name: text("name"),
            gender,
            report_type: text("type"),
            breed: text("breed"),
            location_text: text("location_text"),
            latitude,
            longitude,
            contact_info: fields.get("contact_info").cloned(),
        })
    }
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Multipart body of `POST /api/reports`, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateReportForm {
    #[schema(example = "Oyen")]
    pub name: String,
    #[schema(example = "male")]
    pub gender: String,
    #[schema(example = "Hilang")]
    pub r#type: String,
    #[schema(example = "Domestic Shorthair")]
    pub breed: String,
    #[schema(example = "Jl. Menteng Raya, Jakarta Pusat")]
    pub location_text: String,
    #[schema(example = -6.1966)]
    pub latitude: f64,
    #[schema(example = 106.8317)]
    pub longitude: f64,
    pub contact_info: Option<String>,
    /// 1-5 photos (jpeg, png, webp; max 5MB each), repeated `images` parts
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub images: Vec<String>,
}

/// Multipart body of `POST /api/reports/{id}/images`, for OpenAPI documentation only
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct AddImagesForm {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub images: Vec<String>,
}

/// Full edit of a report; `image_urls` must keep at least one existing photo
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReportDto {
    #[serde(flatten)]
    #[validate(nested)]
    pub form: ReportFormDto,

    /// Photos to keep, a subset of the current ones; dropped photos are deleted
    #[validate(custom(function = "validate_image_urls"))]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
}

/// A photo received in a multipart request
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Type and size checks; returns a "field: message" entry on failure
    pub fn check(&self) -> Result<(), String> {
        if self.data.is_empty() {
            return Err(format!("images: '{}' is empty", self.file_name));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(format!(
                "images: '{}' has unsupported type '{}'. Allowed types: {}",
                self.file_name,
                self.content_type,
                ALLOWED_IMAGE_TYPES.join(", ")
            ));
        }
        if self.data.len() > MAX_IMAGE_SIZE {
            return Err(format!(
                "images: '{}' is larger than {} MB",
                self.file_name,
                MAX_IMAGE_SIZE / 1024 / 1024
            ));
        }
        Ok(())
    }

    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_fields(lat: &str, lon: &str) -> HashMap<String, String> {
        [
            ("name", " Oyen  "),
            ("gender", "Male"),
            ("type", "lost"),
            ("breed", "Domestic"),
            ("location_text", "Menteng,   Jakarta"),
            ("latitude", lat),
            ("longitude", lon),
            ("contact_info", "  "),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_form_from_fields_normalizes() {
        let form = ReportFormDto::from_fields(&form_fields("-6.19", "106.83"))
            .unwrap()
            .normalized();

        assert_eq!(form.name, "Oyen");
        assert_eq!(form.gender, CatGender::Male);
        assert_eq!(form.report_type, "Hilang");
        assert_eq!(form.location_text, "Menteng, Jakarta");
        assert_eq!(form.contact_info, None);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_boundary_coordinates_are_accepted() {
        for (lat, lon) in [("-90", "-180"), ("90", "180"), ("0", "0")] {
            let form = ReportFormDto::from_fields(&form_fields(lat, lon)).unwrap();
            assert!(form.validate().is_ok(), "{}, {} should be valid", lat, lon);
        }
    }

    #[test]
    fn test_out_of_range_coordinates_are_field_errors() {
        let form = ReportFormDto::from_fields(&form_fields("90.0001", "-180.5")).unwrap();
        let AppError::InvalidFields(errors) = AppError::from(form.validate().unwrap_err()) else {
            panic!("expected field errors");
        };
        assert_eq!(
            errors,
            vec![
                "latitude: Latitude must be between -90 and 90".to_string(),
                "longitude: Longitude must be between -180 and 180".to_string(),
            ]
        );
    }

    #[test]
    fn test_unparseable_fields_are_all_reported() {
        let mut fields = form_fields("NaN", "east");
        fields.insert("gender".to_string(), "kitten".to_string());

        let Err(AppError::InvalidFields(errors)) = ReportFormDto::from_fields(&fields) else {
            panic!("expected field errors");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.starts_with("gender:")));
        assert!(errors.contains(&"latitude: Latitude must be a number".to_string()));
        assert!(errors.contains(&"longitude: Longitude must be a number".to_string()));
    }

    #[test]
    fn test_blank_required_fields_fail_validation() {
        let mut fields = form_fields("1", "1");
        fields.insert("name".to_string(), "   ".to_string());
        fields.remove("breed");

        let form = ReportFormDto::from_fields(&fields).unwrap().normalized();
        let AppError::InvalidFields(errors) = AppError::from(form.validate().unwrap_err()) else {
            panic!("expected field errors");
        };
        assert!(errors.iter().any(|e| e.starts_with("name:")));
        assert!(errors.iter().any(|e| e.starts_with("breed:")));
    }

    #[test]
    fn test_update_dto_validates_nested_form_and_images() {
        let dto: UpdateReportDto = serde_json::from_value(serde_json::json!({
            "name": "Mimi",
            "gender": "female",
            "type": "Ditemukan",
            "breed": "Persian",
            "location_text": "Kemang",
            "latitude": 95.0,
            "longitude": 106.8,
            "image_urls": []
        }))
        .unwrap();

        let AppError::InvalidFields(errors) = AppError::from(dto.validate().unwrap_err()) else {
            panic!("expected field errors");
        };
        assert!(errors.iter().any(|e| e.starts_with("latitude:")));
        assert!(errors.iter().any(|e| e.starts_with("image_urls:")));
    }

    #[test]
    fn test_list_query_into_criteria() {
        let query = ListReportsQuery {
            q: Some("  men ".to_string()),
            status: Some("active, found".to_string()),
            gender: None,
            report_type: Some("lost,Ditemukan".to_string()),
            sort: Some("name-desc".to_string()),
        };
        let criteria = query.into_criteria().unwrap();

        assert_eq!(criteria.query, "men");
        assert_eq!(criteria.sort, SortOption::NameDesc);
        assert_eq!(criteria.filters.active_count(), 4);
        assert!(criteria.filters.report_type.contains("Hilang"));
    }

    #[test]
    fn test_list_query_rejects_unknown_values() {
        let query = ListReportsQuery {
            status: Some("active,lost".to_string()),
            gender: Some("kitten".to_string()),
            sort: Some("random".to_string()),
            ..Default::default()
        };
        let Err(AppError::InvalidFields(errors)) = query.into_criteria() else {
            panic!("expected field errors");
        };
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_image_upload_checks() {
        let ok = ImageUpload {
            file_name: "oyen.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        };
        assert!(ok.check().is_ok());
        assert_eq!(ok.extension(), "png");

        let gif = ImageUpload {
            content_type: "image/gif".to_string(),
            ..ok.clone()
        };
        assert!(gif.check().unwrap_err().contains("unsupported type"));

        let huge = ImageUpload {
            data: vec![0; MAX_IMAGE_SIZE + 1],
            ..ok.clone()
        };
        assert!(huge.check().is_err());

        let empty = ImageUpload { data: vec![], ..ok };
        assert!(empty.check().is_err());
    }
}
