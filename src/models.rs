use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Stored Records (Mapped to Database) ---

/// User
///
/// Mirror of an identity-provider account in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// Category
///
/// A row of the `categories` table. Serialized as-is; it has no owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Post
///
/// A `posts` row joined with the owner's username.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub owner_id: Uuid,
    // Loaded via a JOIN on `users`.
    pub owner: String,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Comment
///
/// A `comments` row joined with the owner's username.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: Uuid,
    pub owner: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Like
///
/// A `likes` row. At most one per (owner, post), enforced by a unique constraint.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Like {
    pub id: i64,
    pub owner_id: Uuid,
    pub owner: String,
    pub post_id: i64,
}

/// Favorite
///
/// A `favorites` row. Created and removed only by the toggle action.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Favorite {
    pub id: i64,
    pub owner_id: Uuid,
    pub post_id: i64,
}

// --- Request Payloads (Input Schemas) ---
//
// None of these carry an owner: it is always bound to the requesting user,
// and unknown fields such as a client-supplied `owner` are ignored.

/// CreateCategoryRequest
///
/// Input payload for POST /categories/.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// PostWriteRequest
///
/// Full payload for POST /posts/ and PUT /posts/{id}/.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct PostWriteRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[serde(default)]
    pub category: Option<i64>,
}

/// PostPatchRequest
///
/// Partial payload for PATCH /posts/{id}/. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct PostPatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub body: Option<String>,

    /// Absent: unchanged. `null`: cleared. A number: reassigned.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schema(value_type = Option<i64>)]
    #[ts(as = "Option<Option<i64>>", optional)]
    pub category: Option<Option<i64>>,
}

/// CommentWriteRequest
///
/// Full payload for POST /comments/ and PUT /comments/{id}/.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CommentWriteRequest {
    pub post: i64,
    #[validate(length(min = 1))]
    pub body: String,
}

/// CommentPatchRequest
///
/// Partial payload for PATCH /comments/{id}/.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CommentPatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub body: Option<String>,
}

// --- Repository Inputs ---

/// PostFilter
///
/// Query parameters accepted by the post listing. All filters combine with AND.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostFilter {
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    /// Exact match on the owner's user id.
    pub owner: Option<Uuid>,
    /// Exact match on the category id.
    pub category: Option<i64>,
}

/// NewPost
///
/// A validated post ready for insertion.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: Uuid,
    pub title: String,
    pub body: String,
    pub category_id: Option<i64>,
}

/// PostChanges
///
/// Column updates for an existing post. `None` leaves a column as it is;
/// `category: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<Option<i64>>,
}

impl From<PostWriteRequest> for PostChanges {
    fn from(req: PostWriteRequest) -> Self {
        Self {
            title: Some(req.title),
            body: Some(req.body),
            category: Some(req.category),
        }
    }
}

impl From<PostPatchRequest> for PostChanges {
    fn from(req: PostPatchRequest) -> Self {
        Self {
            title: req.title,
            body: req.body,
            category: req.category,
        }
    }
}

/// CommentChanges
///
/// Column updates for an existing comment.
#[derive(Debug, Clone, Default)]
pub struct CommentChanges {
    pub post_id: Option<i64>,
    pub body: Option<String>,
}

impl From<CommentWriteRequest> for CommentChanges {
    fn from(req: CommentWriteRequest) -> Self {
        Self {
            post_id: Some(req.post),
            body: Some(req.body),
        }
    }
}

impl From<CommentPatchRequest> for CommentChanges {
    fn from(req: CommentPatchRequest) -> Self {
        Self {
            post_id: req.post,
            body: req.body,
        }
    }
}
