use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{Category, Comment, Like, Post},
    policy::ResponseShape,
    repository::RepositoryState,
};

// --- Post Representations ---

/// PostListItem
///
/// Lightweight shape used by listings. The body is omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostListItem {
    pub id: i64,
    pub title: String,
    pub owner: String,
    pub category: Option<i64>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostListItem {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            owner: post.owner,
            category: post.category_id,
            created_at: post.created_at,
        }
    }
}

/// PostDetail
///
/// Full shape returned by retrieve, with the category, comments and like
/// count expanded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub owner: String,
    pub owner_id: Uuid,
    pub category: Option<Category>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub comments: Vec<CommentView>,
    pub likes_count: i64,
}

/// PostWriteView
///
/// Shape echoed by create/update. `owner` is read-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostWriteView {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub category: Option<i64>,
    pub owner: String,
}

impl From<Post> for PostWriteView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            category: post.category_id,
            owner: post.owner,
        }
    }
}

/// PostRepresentation
///
/// One post rendered in whichever shape the action's rule selects.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum PostRepresentation {
    Detail(PostDetail),
    Write(PostWriteView),
    List(PostListItem),
}

impl PostRepresentation {
    /// represent
    ///
    /// Renders `post` for `shape`. Only the detail shape touches the repository,
    /// to expand its relations.
    pub async fn represent(
        repo: &RepositoryState,
        shape: ResponseShape,
        post: Post,
    ) -> ApiResult<Self> {
        match shape {
            ResponseShape::PostDetail => {
                let category = match post.category_id {
                    Some(id) => repo.find_category(id).await?,
                    None => None,
                };
                let comments = repo
                    .list_comments(Some(post.id))
                    .await?
                    .into_iter()
                    .map(CommentView::from)
                    .collect();
                let likes_count = repo.count_likes(post.id).await?;

                Ok(Self::Detail(PostDetail {
                    id: post.id,
                    title: post.title,
                    body: post.body,
                    owner: post.owner,
                    owner_id: post.owner_id,
                    category,
                    created_at: post.created_at,
                    comments,
                    likes_count,
                }))
            }
            ResponseShape::PostWrite => Ok(Self::Write(post.into())),
            _ => Ok(Self::List(post.into())),
        }
    }
}

// --- Comment & Like Representations ---

/// CommentView
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CommentView {
    pub id: i64,
    pub post: i64,
    pub owner: String,
    pub body: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post: comment.post_id,
            owner: comment.owner,
            body: comment.body,
            created_at: comment.created_at,
        }
    }
}

/// LikeView
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LikeView {
    pub id: i64,
    pub owner: String,
    pub post: i64,
}

impl From<Like> for LikeView {
    fn from(like: Like) -> Self {
        Self {
            id: like.id,
            owner: like.owner,
            post: like.post_id,
        }
    }
}

/// Message
///
/// Textual confirmation, e.g. `{"detail": "You Liked The Post"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Message {
    pub detail: String,
}

impl Message {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
