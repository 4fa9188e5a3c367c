use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::policy::Category;
use crate::posts::repo::{Post, PostWithAuthor};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub category: Category,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author: AuthorRef,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<PostWithAuthor> for PostResponse {
    fn from(post: PostWithAuthor) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            category: post.category,
            author: AuthorRef {
                id: post.author_id,
                username: post.author_username,
            },
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl PostResponse {
    pub fn from_post(post: Post, author_username: String) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            category: post.category,
            author: AuthorRef {
                id: post.author_id,
                username: author_username,
            },
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
