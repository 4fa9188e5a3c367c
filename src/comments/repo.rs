use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Comment joined with its author's username for listing.
#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub post_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Oldest first, thread order.
pub async fn list_by_post(db: &PgPool, post_id: Uuid) -> sqlx::Result<Vec<CommentWithAuthor>> {
    sqlx::query_as::<_, CommentWithAuthor>(
        r#"
        SELECT c.id, c.content, c.author_id, u.username AS author_username,
               c.post_id, c.created_at, c.updated_at
        FROM comments c
        JOIN users u ON u.id = c.author_id
        WHERE c.post_id = $1
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Comment>> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, content, author_id, post_id, created_at, updated_at
        FROM comments
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(
    db: &PgPool,
    content: &str,
    author_id: Uuid,
    post_id: Uuid,
) -> sqlx::Result<Comment> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (content, author_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING id, content, author_id, post_id, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(author_id)
    .bind(post_id)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, content: Option<&str>) -> sqlx::Result<Comment> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments
        SET content = COALESCE($2, content),
            updated_at = now()
        WHERE id = $1
        RETURNING id, content, author_id, post_id, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(content)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
