//! Resource controllers. Each handler resolves its policy rule first, then
//! touches the repository, then renders the shape the rule selects.

pub mod categories;
pub mod comments;
pub mod posts;

pub use categories::*;
pub use comments::*;
pub use posts::*;

use crate::{
    error::{ApiError, ApiResult},
    models::{Comment, Post},
    repository::RepositoryState,
};

/// Error for a write payload naming a row that does not exist.
pub(crate) fn invalid_reference(field: &str, id: i64) -> ApiError {
    ApiError::Validation(format!("{field}: Invalid pk \"{id}\" - object does not exist."))
}

/// Loads the target post or fails with `NotFound`.
pub(crate) async fn load_post(repo: &RepositoryState, id: i64) -> ApiResult<Post> {
    repo.find_post(id).await?.ok_or(ApiError::NotFound)
}

/// Loads the target comment or fails with `NotFound`.
pub(crate) async fn load_comment(repo: &RepositoryState, id: i64) -> ApiResult<Comment> {
    repo.find_comment(id).await?.ok_or(ApiError::NotFound)
}
