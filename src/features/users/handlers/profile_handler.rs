use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{UpdateProfileDto, UserProfileResponseDto};
use crate::features::users::services::UserProfileService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserProfileResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<UserProfileService>>,
) -> Result<Json<ApiResponse<UserProfileResponseDto>>> {
    let profile = service.get_or_create(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile.into()), None, None)))
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserProfileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<UserProfileService>>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<UserProfileResponseDto>>> {
    let dto = dto.normalized();
    if dto.is_empty() {
        return Err(AppError::BadRequest(
            "Nothing to update. Provide display_name, contact_info or bio.".to_string(),
        ));
    }
    dto.validate()?;

    let profile = service.update(&user, &dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile.into()),
        Some("Profile updated successfully".to_string()),
        None,
    )))
}
