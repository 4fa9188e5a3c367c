use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::policy::Category;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub category: Category,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Post joined with its author's username for listing.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithAuthor {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub category: Category,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn list_by_category(
    db: &PgPool,
    category: Category,
) -> sqlx::Result<Vec<PostWithAuthor>> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.id, p.title, p.content, p.author_id, u.username AS author_username,
               p.category, p.created_at, p.updated_at
        FROM posts p
        JOIN users u ON u.id = p.author_id
        WHERE p.category = $1
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(category)
    .fetch_all(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<PostWithAuthor>> {
    sqlx::query_as::<_, PostWithAuthor>(
        r#"
        SELECT p.id, p.title, p.content, p.author_id, u.username AS author_username,
               p.category, p.created_at, p.updated_at
        FROM posts p
        JOIN users u ON u.id = p.author_id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn create(
    db: &PgPool,
    title: &str,
    content: &str,
    author_id: Uuid,
    category: Category,
) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, content, author_id, category)
        VALUES ($1, $2, $3, $4)
        RETURNING id, title, content, author_id, category, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(author_id)
    .bind(category)
    .fetch_one(db)
    .await
}

/// Absent fields keep their current value. Category is immutable once
/// the post exists.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
) -> sqlx::Result<Post> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = COALESCE($2, title),
            content = COALESCE($3, content),
            updated_at = now()
        WHERE id = $1
        RETURNING id, title, content, author_id, category, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .fetch_one(db)
    .await
}

/// Comments go with the post via the FK cascade.
pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
