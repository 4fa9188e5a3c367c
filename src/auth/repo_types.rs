use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::policy::Role;

/// User record in the database. Secret-bearing columns never serialize.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub email_encrypted: String, // AES-GCM blob, randomized per write
    #[serde(skip_serializing)]
    pub email_fingerprint: String, // deterministic lookup key
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>, // present only while unverified
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>, // at most one live session
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_columns_never_serialize() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email_encrypted: "blob".into(),
            email_fingerprint: "fp".into(),
            password_hash: "$argon2id$...".into(),
            role: Role::Player,
            is_verified: false,
            verification_token: Some("token".into()),
            refresh_token: Some("refresh".into()),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email_encrypted").is_none());
        assert!(json.get("email_fingerprint").is_none());
        assert!(json.get("verification_token").is_none());
        assert!(json.get("refresh_token").is_none());
        assert_eq!(json["username"], "alice");
    }
}
