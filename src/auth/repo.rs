use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::policy::Role;

const USER_COLUMNS: &str = "id, username, email_encrypted, email_fingerprint, password_hash, \
                            role, is_verified, verification_token, refresh_token, created_at";

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
    }

    /// Lookup by the deterministic digest of the plaintext email; the
    /// ciphertext column is randomized and cannot be compared.
    pub async fn find_by_fingerprint(db: &PgPool, fingerprint: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email_fingerprint = $1"
        ))
        .bind(fingerprint)
        .fetch_optional(db)
        .await
    }

    /// Insert a new unverified user. Unique constraints on username and
    /// email_fingerprint are the backstop against concurrent duplicates.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email_encrypted: &str,
        email_fingerprint: &str,
        password_hash: &str,
        role: Role,
        verification_token: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email_encrypted, email_fingerprint, password_hash, \
                                role, verification_token) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email_encrypted)
        .bind(email_fingerprint)
        .bind(password_hash)
        .bind(role)
        .bind(verification_token)
        .fetch_one(db)
        .await
    }

    /// Single-statement consume: the row only matches while the token is
    /// still set, so of two concurrent calls with the same token exactly
    /// one gets the row back.
    pub async fn consume_verification_token(db: &PgPool, token: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_verified = TRUE, verification_token = NULL \
             WHERE verification_token = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(token)
        .fetch_optional(db)
        .await
    }

    /// Overwrites any previously stored refresh token, invalidating the
    /// prior session even if its token is unexpired.
    pub async fn store_refresh_token(db: &PgPool, id: Uuid, token: &str) -> sqlx::Result<()> {
        let result = sqlx::query("UPDATE users SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
        Ok(())
    }

    /// Idempotent: clearing an already-clear token is not an error.
    pub async fn clear_refresh_token(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET refresh_token = NULL WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
