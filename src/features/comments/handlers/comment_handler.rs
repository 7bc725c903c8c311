use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::comments::dtos::{CommentResponseDto, CreateCommentDto};
use crate::features::comments::models::CreateComment;
use crate::features::comments::services::CommentService;
use crate::shared::types::{ApiResponse, Meta};

#[derive(Clone)]
pub struct CommentState {
    pub comment_service: Arc<CommentService>,
}

/// Comments on a report, newest first
#[utoipa::path(
    get,
    path = "/api/reports/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Comments", body = ApiResponse<Vec<CommentResponseDto>>)
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<CommentState>,
    Path(report_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<CommentResponseDto>>>> {
    let comments = state.comment_service.list_by_report(report_id).await?;
    let total = comments.len();
    let dtos: Vec<CommentResponseDto> = comments.into_iter().map(|c| c.into()).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::total(total)),
    )))
}

#[utoipa::path(
    post,
    path = "/api/reports/{id}/comments",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment added", body = ApiResponse<CommentResponseDto>),
        (status = 400, description = "Empty or too long comment"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    user: AuthenticatedUser,
    State(state): State<CommentState>,
    Path(report_id): Path<Uuid>,
    AppJson(dto): AppJson<CreateCommentDto>,
) -> Result<(StatusCode, Json<ApiResponse<CommentResponseDto>>)> {
    let dto = dto.trimmed();
    dto.validate()?;

    let comment = state
        .comment_service
        .create(&CreateComment {
            report_id,
            user_id: user.sub.clone(),
            user_name: user.display_name(),
            user_photo_url: user.picture.clone(),
            content: dto.content,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(comment.into()), None, None)),
    ))
}

/// Delete one of your own comments
#[utoipa::path(
    delete,
    path = "/api/reports/{id}/comments/{comment_id}",
    params(
        ("id" = Uuid, Path, description = "Report ID"),
        ("comment_id" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Not the author of the comment"),
        (status = 404, description = "Comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn delete_comment(
    user: AuthenticatedUser,
    State(state): State<CommentState>,
    Path((report_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>> {
    state
        .comment_service
        .delete(report_id, comment_id, &user)
        .await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Comment deleted".to_string()),
        None,
    )))
}
