use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::extractors::{AuthUser, MaybeAuthUser};
use crate::error::ApiError;
use crate::policy::{can_access, can_delete, Category};
use crate::posts::dto::{CreatePostRequest, PostResponse, UpdatePostRequest};
use crate::posts::repo;
use crate::state::AppState;

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/category/:category", get(posts_by_category))
        .route(
            "/posts/:id",
            get(post_by_id).put(update_post).delete(delete_post),
        )
}

/// Read gate shared by every category-scoped read: general is open to
/// anonymous readers, anything else needs an identity the map allows.
fn authorize_read(user: MaybeAuthUser, category: Category) -> Result<(), ApiError> {
    if category == Category::General {
        return Ok(());
    }
    let user = user.require()?;
    if !can_access(user.role, category) {
        warn!(user_id = %user.id, ?category, "category read denied");
        return Err(ApiError::Forbidden(
            "You do not have permission to view this".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, user))]
pub async fn posts_by_category(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(category): Path<Category>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    authorize_read(user, category)?;
    let posts = repo::list_by_category(&state.db, category).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

#[instrument(skip(state, user))]
pub async fn post_by_id(
    State(state): State<AppState>,
    user: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    authorize_read(user, post.category)?;
    Ok(Json(PostResponse::from(post)))
}

#[instrument(skip(state, user, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    if payload.title.trim().is_empty() || payload.content.trim().is_empty() {
        return Err(ApiError::Validation(
            "Please make sure all required fields are sent".into(),
        ));
    }
    if !can_access(user.role, payload.category) {
        warn!(user_id = %user.id, category = ?payload.category, "post creation denied");
        return Err(ApiError::Forbidden(
            "You do not have permission to add this post".into(),
        ));
    }

    let post = repo::create(
        &state.db,
        payload.title.trim(),
        &payload.content,
        user.id,
        payload.category,
    )
    .await?;

    info!(post_id = %post.id, user_id = %user.id, "post created");
    Ok((
        StatusCode::CREATED,
        Json(PostResponse::from_post(post, user.username)),
    ))
}

#[instrument(skip(state, user, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    // Author-only: elevated roles may delete, not edit.
    if post.author_id != user.id {
        return Err(ApiError::Forbidden(
            "Not authorized to update this post".into(),
        ));
    }

    let updated = repo::update(
        &state.db,
        id,
        payload.title.as_deref(),
        payload.content.as_deref(),
    )
    .await?;
    info!(post_id = %id, user_id = %user.id, "post updated");
    Ok(Json(PostResponse::from_post(updated, user.username)))
}

#[instrument(skip(state, user))]
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    if !can_delete(post.author_id, user.id, user.role) {
        warn!(post_id = %id, user_id = %user.id, "post deletion denied");
        return Err(ApiError::Forbidden(
            "Not authorized to delete this post".into(),
        ));
    }

    repo::delete(&state.db, id).await?;
    info!(post_id = %id, user_id = %user.id, "post deleted");
    Ok(Json(serde_json::json!({ "message": "Post deleted successfully" })))
}
