use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use validator::Validate;

use super::{invalid_reference, load_post};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, RepoError},
    extract::{Path, Query},
    models::{NewPost, PostChanges, PostFilter, PostPatchRequest, PostWriteRequest},
    pagination::{Page, PageParams},
    policy::{self, Action},
    repository::RepositoryState,
    serializers::{
        CommentView, LikeView, Message, PostDetail, PostListItem, PostRepresentation,
        PostWriteView,
    },
};

pub const LIKED: &str = "You Liked The Post";
pub const ALREADY_LIKED: &str = "This Post is Already Liked!";
pub const NOT_LIKED: &str = "You Didn't Like This Post!";
pub const ADDED_TO_FAVORITES: &str = "Added to Favorites!";
pub const ALREADY_FAVORITE: &str = "This Post is Already in Favorites!";
// Logged only: a 204 carries no body.
pub const DELETED_FROM_FAVORITES: &str = "Deleted From Favorites!";

/// FavoriteOutcome
///
/// Result of the favorite toggle: 201 with a message when added, 204 with no
/// body when removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    Added,
    Removed,
}

impl IntoResponse for FavoriteOutcome {
    fn into_response(self) -> Response {
        match self {
            FavoriteOutcome::Added => {
                (StatusCode::CREATED, Json(Message::new(ADDED_TO_FAVORITES))).into_response()
            }
            FavoriteOutcome::Removed => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Rejects a category id that does not exist.
async fn ensure_category(repo: &RepositoryState, category: Option<i64>) -> ApiResult<()> {
    if let Some(id) = category {
        if repo.find_category(id).await?.is_none() {
            return Err(invalid_reference("category", id));
        }
    }
    Ok(())
}

// --- Standard Actions ---

/// list_posts
///
/// [Public Route] Lists posts newest first, paginated. `search` matches the
/// title case-insensitively; `owner` and `category` are exact filters.
#[utoipa::path(
    get,
    path = "/posts/",
    params(PostFilter, PageParams),
    responses(
        (status = 200, description = "One page of posts", body = Page<PostListItem>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
    Query(page): Query<PageParams>,
    uri: Uri,
) -> ApiResult<Json<Page<PostListItem>>> {
    policy::authorize(Action::PostList, None)?;

    let count = u64::try_from(state.repo.count_posts(&filter).await?).unwrap_or_default();
    let request = page.resolve(count)?;
    let results = state
        .repo
        .list_posts(&filter, request.limit(), request.offset())
        .await?
        .into_iter()
        .map(PostListItem::from)
        .collect();

    Ok(Json(Page::new(results, count, request, &uri)))
}

/// create_post
///
/// [Authenticated Route] Creates a post owned by the requesting user. Any owner
/// field in the body is ignored.
#[utoipa::path(
    post,
    path = "/posts/",
    request_body = PostWriteRequest,
    responses(
        (status = 201, description = "Created", body = PostWriteView),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PostWriteRequest>,
) -> ApiResult<(StatusCode, Json<PostRepresentation>)> {
    let action = Action::PostCreate;
    policy::authorize(action, Some(&user))?;
    payload.validate()?;
    ensure_category(&state.repo, payload.category).await?;

    let post = state
        .repo
        .create_post(NewPost {
            owner_id: user.id,
            title: payload.title,
            body: payload.body,
            category_id: payload.category,
        })
        .await?;

    tracing::info!(post_id = post.id, owner = %user.username, "post created");
    let body = PostRepresentation::represent(&state.repo, policy::rule(action).shape, post).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// get_post
///
/// [Public Route] Retrieves a post in its detail shape.
#[utoipa::path(
    get,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PostRepresentation>> {
    let action = Action::PostRetrieve;
    policy::authorize(action, None)?;

    let post = load_post(&state.repo, id).await?;
    let body = PostRepresentation::represent(&state.repo, policy::rule(action).shape, post).await?;
    Ok(Json(body))
}

/// Loads, checks ownership, validates and applies `payload`, and renders the result.
async fn change_post(
    state: &AppState,
    user: &AuthUser,
    action: Action,
    id: i64,
    payload: impl Validate + Into<PostChanges>,
) -> ApiResult<Json<PostRepresentation>> {
    policy::authorize(action, Some(user))?;

    let post = load_post(&state.repo, id).await?;
    policy::authorize_object(action, user, post.owner_id)?;

    payload.validate()?;
    let changes: PostChanges = payload.into();
    if let Some(category) = changes.category {
        ensure_category(&state.repo, category).await?;
    }

    let post = state
        .repo
        .update_post(id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(post_id = post.id, action = ?action, "post updated");
    let body = PostRepresentation::represent(&state.repo, policy::rule(action).shape, post).await?;
    Ok(Json(body))
}

/// update_post
///
/// [Authenticated Route] Replaces a post's writable fields. Owner only.
#[utoipa::path(
    put,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = PostWriteRequest,
    responses(
        (status = 200, description = "Updated", body = PostWriteView),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PostWriteRequest>,
) -> ApiResult<Json<PostRepresentation>> {
    change_post(&state, &user, Action::PostUpdate, id, payload).await
}

/// partial_update_post
///
/// [Authenticated Route] Updates only the supplied fields. Owner only.
#[utoipa::path(
    patch,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = PostPatchRequest,
    responses(
        (status = 200, description = "Updated", body = PostWriteView),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn partial_update_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PostPatchRequest>,
) -> ApiResult<Json<PostRepresentation>> {
    change_post(&state, &user, Action::PostPartialUpdate, id, payload).await
}

/// delete_post
///
/// [Authenticated Route] Deletes a post with its comments, likes and favorites.
/// Owner only.
#[utoipa::path(
    delete,
    path = "/posts/{id}/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let action = Action::PostDestroy;
    policy::authorize(action, Some(&user))?;

    let post = load_post(&state.repo, id).await?;
    policy::authorize_object(action, &user, post.owner_id)?;

    if !state.repo.delete_post(id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(post_id = id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- Sub-Actions ---

/// get_post_comments
///
/// [Public Route] Lists the comments of one post, oldest first.
#[utoipa::path(
    get,
    path = "/posts/{id}/comments/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments", body = [CommentView]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<CommentView>>> {
    policy::authorize(Action::PostComments, None)?;

    let post = load_post(&state.repo, id).await?;
    let comments = state
        .repo
        .list_comments(Some(post.id))
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();
    Ok(Json(comments))
}

/// add_to_liked
///
/// [Authenticated Route] Likes a post. A second like by the same user is a
/// conflict, whether caught by the lookup or by the storage constraint.
#[utoipa::path(
    post,
    path = "/posts/{id}/add_to_liked/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 201, description = "Liked", body = Message),
        (status = 400, description = "Already liked", body = Message),
        (status = 404, description = "Not Found")
    )
)]
pub async fn add_to_liked(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    policy::authorize(Action::PostAddToLiked, Some(&user))?;

    let post = load_post(&state.repo, id).await?;
    if state.repo.find_like(user.id, post.id).await?.is_some() {
        return Err(ApiError::Conflict(ALREADY_LIKED.to_string()));
    }

    state
        .repo
        .create_like(user.id, post.id)
        .await
        .map_err(|e| match e {
            RepoError::UniqueViolation => ApiError::Conflict(ALREADY_LIKED.to_string()),
            other => other.into(),
        })?;

    tracing::info!(post_id = post.id, user = %user.username, "post liked");
    Ok((StatusCode::CREATED, Json(Message::new(LIKED))))
}

/// remove_from_liked
///
/// [Authenticated Route] Removes the user's like. Fails if there is none.
#[utoipa::path(
    delete,
    path = "/posts/{id}/remove_from_liked/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Like removed"),
        (status = 400, description = "Not liked", body = Message),
        (status = 404, description = "Not Found")
    )
)]
pub async fn remove_from_liked(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    policy::authorize(Action::PostRemoveFromLiked, Some(&user))?;

    let post = load_post(&state.repo, id).await?;
    if !state.repo.delete_like(user.id, post.id).await? {
        return Err(ApiError::Conflict(NOT_LIKED.to_string()));
    }

    tracing::info!(post_id = post.id, user = %user.username, "like removed");
    Ok(StatusCode::NO_CONTENT)
}

/// get_likes
///
/// [Public Route] Lists the likes of one post.
#[utoipa::path(
    get,
    path = "/posts/{id}/get_likes/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Likes", body = [LikeView]),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_likes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<LikeView>>> {
    policy::authorize(Action::PostGetLikes, None)?;

    let post = load_post(&state.repo, id).await?;
    let likes = state
        .repo
        .list_likes(post.id)
        .await?
        .into_iter()
        .map(LikeView::from)
        .collect();
    Ok(Json(likes))
}

/// favorite_action
///
/// [Authenticated Route] Toggles the post in the user's favorites: removes it
/// when present, adds it otherwise. The delete's row count is the existence
/// check, so two toggles never both observe "absent" and delete.
#[utoipa::path(
    post,
    path = "/posts/{id}/favorite_action/",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 201, description = "Added to favorites", body = Message),
        (status = 204, description = "Removed from favorites"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn favorite_action(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<FavoriteOutcome> {
    policy::authorize(Action::PostFavorite, Some(&user))?;

    let post = load_post(&state.repo, id).await?;
    if state.repo.delete_favorite(user.id, post.id).await? {
        tracing::info!(post_id = post.id, user = %user.username, "{DELETED_FROM_FAVORITES}");
        return Ok(FavoriteOutcome::Removed);
    }

    state
        .repo
        .create_favorite(user.id, post.id)
        .await
        .map_err(|e| match e {
            RepoError::UniqueViolation => ApiError::Conflict(ALREADY_FAVORITE.to_string()),
            other => other.into(),
        })?;

    tracing::info!(post_id = post.id, user = %user.username, "favorite added");
    Ok(FavoriteOutcome::Added)
}
