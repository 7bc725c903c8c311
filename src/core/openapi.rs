use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::breeds::{dtos as breeds_dtos, handlers as breeds_handlers};
use crate::features::comments::{dtos as comments_dtos, handlers as comments_handlers};
use crate::features::geocoding::{dtos as geocoding_dtos, handlers as geocoding_handlers};
use crate::features::reports::services::report_filter::{SortOption, StatusCounts};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{dtos as users_dtos, handlers::profile_handler};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Users
        profile_handler::get_profile,
        profile_handler::update_profile,
        // Reports
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::create_report,
        reports_handlers::update_report,
        reports_handlers::update_report_status,
        reports_handlers::add_report_images,
        reports_handlers::delete_report,
        reports_handlers::list_my_reports,
        // Comments
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        comments_handlers::delete_comment,
        // Geocoding (public)
        geocoding_handlers::reverse_geocode,
        // Breeds
        breeds_handlers::suggest_breeds,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::model::AuthenticatedUser,
            ApiResponse<auth::model::AuthenticatedUser>,
            // Users
            users_dtos::UserProfileResponseDto,
            users_dtos::UpdateProfileDto,
            ApiResponse<users_dtos::UserProfileResponseDto>,
            // Reports
            reports_models::ReportStatus,
            reports_models::CatGender,
            SortOption,
            StatusCounts,
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportListResponseDto,
            reports_dtos::MyReportsResponseDto,
            reports_dtos::ReportFormDto,
            reports_dtos::CreateReportForm,
            reports_dtos::AddImagesForm,
            reports_dtos::UpdateReportDto,
            reports_dtos::UpdateReportStatusDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::ReportListResponseDto>,
            ApiResponse<reports_dtos::MyReportsResponseDto>,
            // Comments
            comments_dtos::CommentResponseDto,
            comments_dtos::CreateCommentDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            // Geocoding
            geocoding_dtos::ReverseGeocodeResponseDto,
            ApiResponse<geocoding_dtos::ReverseGeocodeResponseDto>,
            // Breeds
            breeds_dtos::BreedSuggestionResponseDto,
            breeds_dtos::SuggestBreedForm,
            ApiResponse<breeds_dtos::BreedSuggestionResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Identity of the signed-in user"),
        (name = "users", description = "User profile management"),
        (name = "reports", description = "Lost and found cat reports"),
        (name = "comments", description = "Comments on reports"),
        (name = "geocoding", description = "Reverse geocoding for the location picker (public)"),
        (name = "breeds", description = "Breed suggestions from a photo"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Jejak Meong API",
        version = "0.1.0",
        description = "API documentation for Jejak Meong",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Google ID token"))
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/me",
            "/api/users/me",
            "/api/users/me/reports",
            "/api/reports",
            "/api/reports/{id}",
            "/api/reports/{id}/status",
            "/api/reports/{id}/images",
            "/api/reports/{id}/comments",
            "/api/reports/{id}/comments/{comment_id}",
            "/api/geocode/reverse",
            "/api/breeds/suggest",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Jejak Meong (staging)".to_string(),
            version: "9.9.9".to_string(),
            description: "staging".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Jejak Meong (staging)");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
