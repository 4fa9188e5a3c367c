use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::comments::repo::{Comment, CommentWithAuthor};
use crate::posts::dto::AuthorRef;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub author: AuthorRef,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author: AuthorRef {
                id: comment.author_id,
                username: comment.author_username,
            },
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

impl CommentResponse {
    pub fn from_comment(comment: Comment, author_username: String) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            author: AuthorRef {
                id: comment.author_id,
                username: author_username,
            },
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}
