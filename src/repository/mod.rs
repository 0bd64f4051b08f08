use crate::error::RepoError;
use crate::models::{
    Category, Comment, CommentChanges, Favorite, Like, NewPost, Post, PostChanges, PostFilter,
    User,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository Trait
///
/// The persistence contract injected into every controller. Handlers never
/// see SQL; they call `find`/`list`/`create`/`update`/`delete` style methods
/// and receive constraint violations as `RepoError` variants.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` usable across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    // --- Categories ---
    async fn list_categories(&self) -> RepoResult<Vec<Category>>;
    async fn find_category(&self, id: i64) -> RepoResult<Option<Category>>;
    // Unique on name.
    async fn create_category(&self, name: String) -> RepoResult<Category>;

    // --- Posts ---
    // Newest first. `limit`/`offset` page through the filtered set.
    async fn list_posts(&self, filter: &PostFilter, limit: i64, offset: i64) -> RepoResult<Vec<Post>>;
    async fn count_posts(&self, filter: &PostFilter) -> RepoResult<i64>;
    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>>;
    // Fails with ForeignKeyViolation when the category does not exist.
    async fn create_post(&self, post: NewPost) -> RepoResult<Post>;
    async fn update_post(&self, id: i64, changes: PostChanges) -> RepoResult<Option<Post>>;
    // Cascades to comments, likes and favorites. Returns false if nothing was deleted.
    async fn delete_post(&self, id: i64) -> RepoResult<bool>;

    // --- Comments ---
    // Oldest first. `post_id` narrows the listing to a single post.
    async fn list_comments(&self, post_id: Option<i64>) -> RepoResult<Vec<Comment>>;
    async fn find_comment(&self, id: i64) -> RepoResult<Option<Comment>>;
    async fn create_comment(&self, post_id: i64, owner_id: Uuid, body: String) -> RepoResult<Comment>;
    async fn update_comment(&self, id: i64, changes: CommentChanges) -> RepoResult<Option<Comment>>;
    async fn delete_comment(&self, id: i64) -> RepoResult<bool>;

    // --- Likes ---
    async fn find_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Option<Like>>;
    async fn list_likes(&self, post_id: i64) -> RepoResult<Vec<Like>>;
    async fn count_likes(&self, post_id: i64) -> RepoResult<i64>;
    // Fails with UniqueViolation when (owner, post) is already liked.
    async fn create_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Like>;
    async fn delete_like(&self, owner_id: Uuid, post_id: i64) -> RepoResult<bool>;

    // --- Favorites ---
    // Fails with UniqueViolation when (owner, post) is already a favorite.
    async fn create_favorite(&self, owner_id: Uuid, post_id: i64) -> RepoResult<Favorite>;
    async fn delete_favorite(&self, owner_id: Uuid, post_id: i64) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in the application state.
pub type RepositoryState = Arc<dyn Repository>;
