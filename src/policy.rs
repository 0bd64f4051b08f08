//! Per-action authorization and response-shape table.
//!
//! Every controller action is resolved once per request into a [`Rule`]:
//! the capability the caller must hold and the representation the response
//! uses. Role-level checks run before any data access; the ownership check
//! runs after the target row has been loaded.

use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError};

/// Every action the controllers expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CategoryList,
    CategoryCreate,

    PostList,
    PostCreate,
    PostRetrieve,
    PostUpdate,
    PostPartialUpdate,
    PostDestroy,
    PostComments,
    PostAddToLiked,
    PostRemoveFromLiked,
    PostGetLikes,
    PostFavorite,

    CommentList,
    CommentCreate,
    CommentRetrieve,
    CommentUpdate,
    CommentPartialUpdate,
    CommentDestroy,
}

/// What the caller must be to perform an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Anyone, including anonymous callers.
    Open,
    /// Any authenticated user.
    Authenticated,
    /// An authenticated user who owns the target row.
    Owner,
}

/// The representation an action responds with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Category,
    PostList,
    PostDetail,
    PostWrite,
    Comment,
    Like,
    Message,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub capability: Capability,
    pub shape: ResponseShape,
}

const fn rule_of(capability: Capability, shape: ResponseShape) -> Rule {
    Rule { capability, shape }
}

/// The decision table.
pub const fn rule(action: Action) -> Rule {
    use Action::*;
    use Capability::*;
    use ResponseShape as S;

    match action {
        CategoryList | CategoryCreate => rule_of(Open, S::Category),

        PostList => rule_of(Open, S::PostList),
        PostRetrieve => rule_of(Open, S::PostDetail),
        PostComments => rule_of(Open, S::Comment),
        PostGetLikes => rule_of(Open, S::Like),
        PostCreate => rule_of(Authenticated, S::PostWrite),
        PostAddToLiked | PostFavorite => rule_of(Authenticated, S::Message),
        PostRemoveFromLiked => rule_of(Authenticated, S::Empty),
        PostUpdate | PostPartialUpdate => rule_of(Owner, S::PostWrite),
        PostDestroy => rule_of(Owner, S::Empty),

        CommentList | CommentRetrieve => rule_of(Open, S::Comment),
        CommentCreate => rule_of(Authenticated, S::Comment),
        CommentUpdate | CommentPartialUpdate => rule_of(Owner, S::Comment),
        CommentDestroy => rule_of(Owner, S::Empty),
    }
}

/// authorize
///
/// Role-level check, evaluated before any row is loaded.
pub fn authorize(action: Action, user: Option<&AuthUser>) -> Result<(), ApiError> {
    match (rule(action).capability, user) {
        (Capability::Open, _) | (_, Some(_)) => Ok(()),
        (Capability::Authenticated | Capability::Owner, None) => Err(ApiError::Unauthenticated),
    }
}

/// authorize_object
///
/// Object-level `IsAuthor` check against the loaded row's owner. A no-op for
/// actions that do not require ownership.
pub fn authorize_object(action: Action, user: &AuthUser, owner_id: Uuid) -> Result<(), ApiError> {
    if rule(action).capability == Capability::Owner && user.id != owner_id {
        tracing::info!(
            user_id = %user.id,
            owner_id = %owner_id,
            action = ?action,
            "ownership check failed"
        );
        return Err(ApiError::Forbidden);
    }
    Ok(())
}
