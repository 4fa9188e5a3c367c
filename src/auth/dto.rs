use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::policy::Role;

/// Request body for user registration. Role comes from the closed enum;
/// an unknown role string fails deserialization before reaching the core.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for token rotation and logout. The refresh token rides
/// in the body; cookie transport is a per-deployment choice left to the
/// edge.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Public part of the user returned to clients. No email, no hashes.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Response returned after registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Response returned after login: a fresh access/refresh pair.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Response returned after rotation: a fresh access token only, the
/// refresh token stays as it was.
#[derive(Debug, Serialize)]
pub struct RotateResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_exposes_no_secrets() {
        let user = PublicUser {
            id: Uuid::new_v4(),
            username: "alice".into(),
            role: Role::Player,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice"));
        assert!(json.contains("\"player\""));
        assert!(!json.contains("email"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn register_request_rejects_unknown_role() {
        let body = r#"{"username":"a","email":"a@x.com","password":"pw","role":"wizard"}"#;
        assert!(serde_json::from_str::<RegisterRequest>(body).is_err());
    }
}
