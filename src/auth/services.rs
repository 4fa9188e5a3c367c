use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::auth::dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::User;
use crate::auth::secrets::{email_fingerprint, generate_verification_token};
use crate::error::ApiError;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration: fingerprint, encrypt, hash, persist, then dispatch the
/// verification mail, in that order.
pub async fn register(state: &AppState, payload: RegisterRequest) -> Result<PublicUser, ApiError> {
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Must provide all of username, email, password, and role".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!("registration with invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("registration with short password");
        return Err(ApiError::Validation("Password too short".into()));
    }

    let fingerprint = email_fingerprint(&email);
    if User::find_by_username(&state.db, &username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(ApiError::Conflict("Username is already in use".into()));
    }
    if User::find_by_fingerprint(&state.db, &fingerprint)
        .await?
        .is_some()
    {
        warn!("email already registered");
        return Err(ApiError::Conflict("Email is already in use".into()));
    }

    let email_encrypted = state.cipher.encrypt(&email)?;
    let password_hash = hash_password(&payload.password).map_err(ApiError::Internal)?;
    let token = generate_verification_token();

    let user = User::create(
        &state.db,
        &username,
        &email_encrypted,
        &fingerprint,
        &password_hash,
        payload.role,
        &token,
    )
    .await?;

    // The mail contract wants the plaintext address, recovered from the
    // stored blob. Fire-and-forget: the caller's 201 does not wait on
    // delivery, and a send failure is only logged.
    let recipient = state.cipher.decrypt(&user.email_encrypted)?;
    let link = format!("{}/verify-email/{}", state.config.verification_base_url, token);
    let mailer = Arc::clone(&state.mailer);
    tokio::spawn(async move {
        if let Err(err) = mailer.send_verification(&recipient, &link).await {
            error!(error = %err, "failed to send verification email");
        }
    });

    info!(user_id = %user.id, %username, role = ?user.role, "user registered");
    Ok(PublicUser::from(&user))
}

/// Consumes a verification token. Single-use: the conditional update in
/// the repo clears the token in the same statement that matches it, so a
/// second call with the same token finds nothing.
pub async fn verify_email(state: &AppState, token: &str) -> Result<(), ApiError> {
    match User::consume_verification_token(&state.db, token).await? {
        Some(user) => {
            info!(user_id = %user.id, "email verified");
            Ok(())
        }
        None => Err(ApiError::NotFound("Invalid or expired token".into())),
    }
}

/// Password login. Unknown username and wrong password produce the same
/// outcome; a correct but unverified login is told to verify first.
pub async fn login(state: &AppState, payload: LoginRequest) -> Result<LoginResponse, ApiError> {
    let username = payload.username.trim();

    let user = match User::find_by_username(&state.db, username).await? {
        Some(user) => user,
        None => {
            warn!(%username, "login with unknown username");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let ok = verify_password(&payload.password, &user.password_hash).map_err(ApiError::Internal)?;
    if !ok {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }
    if !user.is_verified {
        warn!(user_id = %user.id, "login before email verification");
        return Err(ApiError::Unverified);
    }

    let keys = JwtKeys::from_config(&state.config.jwt);
    let access_token = keys
        .sign_access(user.id, &user.username, user.role)
        .map_err(ApiError::Internal)?;
    let refresh_token = keys.sign_refresh(user.id).map_err(ApiError::Internal)?;

    // Overwriting the stored token is what ends any earlier session; if
    // the write fails the whole login fails, never a half-minted pair.
    User::store_refresh_token(&state.db, user.id, &refresh_token).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(LoginResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(&user),
    })
}

/// Exchanges a live refresh token for a fresh access token. The refresh
/// token itself is left untouched.
pub async fn rotate(state: &AppState, refresh_token: &str) -> Result<String, ApiError> {
    let keys = JwtKeys::from_config(&state.config.jwt);
    let claims = keys.verify_refresh(refresh_token)?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(ApiError::RevokedToken)?;

    // A signed, unexpired token is still dead if it is not the one on
    // the row: logout cleared it, or a newer login replaced it.
    if user.refresh_token.as_deref() != Some(refresh_token) {
        warn!(user_id = %user.id, "refresh token superseded or revoked");
        return Err(ApiError::RevokedToken);
    }

    let access_token = keys
        .sign_access(user.id, &user.username, user.role)
        .map_err(ApiError::Internal)?;
    info!(user_id = %user.id, "access token rotated");
    Ok(access_token)
}

/// Logout: clears the stored refresh token. Idempotent.
pub async fn logout(state: &AppState, refresh_token: &str) -> Result<(), ApiError> {
    let keys = JwtKeys::from_config(&state.config.jwt);
    let claims = keys.verify_refresh(refresh_token)?;

    User::clear_refresh_token(&state.db, claims.sub).await?;
    info!(user_id = %claims.sub, "user logged out");
    Ok(())
}
