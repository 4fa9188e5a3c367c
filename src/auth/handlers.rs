use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::auth::dto::{
    LoginRequest, LoginResponse, PublicUser, RefreshRequest, RegisterRequest, RegisterResponse,
    RotateResponse,
};
use crate::auth::extractors::AuthUser;
use crate::auth::services;
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify-email/:token", get(verify_email))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered, please check your email to verify your account".into(),
            user,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Redirect, ApiError> {
    services::verify_email(&state, &token).await?;
    Ok(Redirect::to(&format!(
        "{}/email-verified",
        state.config.frontend_origin
    )))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = services::login(&state, payload).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<RotateResponse>, ApiError> {
    let token = payload
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;
    let access_token = services::rotate(&state, &token).await?;
    Ok(Json(RotateResponse { access_token }))
}

#[instrument(skip(state, payload))]
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = payload
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingToken)?;
    services::logout(&state, &token).await?;
    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

/// Echo of the identity carried by the presented access token.
#[instrument(skip_all)]
pub async fn me(user: AuthUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: user.id,
        username: user.username,
        role: user.role,
    })
}
