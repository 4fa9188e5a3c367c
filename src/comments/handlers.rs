use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::{AuthUser, MaybeAuthUser};
use crate::comments::dto::{CommentResponse, CreateCommentRequest, UpdateCommentRequest};
use crate::comments::repo;
use crate::error::ApiError;
use crate::policy::{can_access, can_delete, Category};
use crate::posts::repo as posts_repo;
use crate::state::AppState;

pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/comments", post(create_comment))
        .route("/comments/post/:post_id", get(comments_by_post))
        .route("/comments/:id", put(update_comment).delete(delete_comment))
}

#[instrument(skip(state, user))]
pub async fn comments_by_post(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let post = posts_repo::find_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    // The comment thread inherits its gate from the parent post's
    // category; general threads stay readable without a login.
    if post.category != Category::General {
        let user = user.require()?;
        if !can_access(user.role, post.category) {
            warn!(user_id = %user.id, category = ?post.category, "comment read denied");
            return Err(ApiError::Forbidden(
                "You do not have permission to view these comments".into(),
            ));
        }
    }

    let comments = repo::list_by_post(&state.db, post_id).await?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}

#[instrument(skip(state, user, payload))]
pub async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::Validation("Comment content is required".into()));
    }

    let post = posts_repo::find_by_id(&state.db, payload.post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    if !can_access(user.role, post.category) {
        warn!(user_id = %user.id, category = ?post.category, "comment creation denied");
        return Err(ApiError::Forbidden(
            "You do not have permission to add a comment".into(),
        ));
    }

    let comment = repo::create(&state.db, &payload.content, user.id, payload.post_id).await?;
    info!(comment_id = %comment.id, user_id = %user.id, "comment created");
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::from_comment(comment, user.username)),
    ))
}

#[instrument(skip(state, user, payload))]
pub async fn update_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;

    if comment.author_id != user.id {
        return Err(ApiError::Forbidden(
            "Not authorized to update this comment".into(),
        ));
    }

    let updated = repo::update(&state.db, id, payload.content.as_deref()).await?;
    info!(comment_id = %id, user_id = %user.id, "comment updated");
    Ok(Json(CommentResponse::from_comment(updated, user.username)))
}

#[instrument(skip(state, user))]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let comment = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;

    if !can_delete(comment.author_id, user.id, user.role) {
        warn!(comment_id = %id, user_id = %user.id, "comment deletion denied");
        return Err(ApiError::Forbidden(
            "You are not authorized to delete this comment".into(),
        ));
    }

    repo::delete(&state.db, id).await?;
    info!(comment_id = %id, user_id = %user.id, "comment deleted");
    Ok(Json(serde_json::json!({ "message": "Comment deleted successfully" })))
}
