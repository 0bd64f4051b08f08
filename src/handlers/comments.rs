use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use super::{invalid_reference, load_comment};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult, RepoError},
    extract::Path,
    models::{CommentChanges, CommentPatchRequest, CommentWriteRequest},
    policy::{self, Action},
    repository::RepositoryState,
    serializers::CommentView,
};

/// Rejects a post id that does not exist.
async fn ensure_post(repo: &RepositoryState, post_id: i64) -> ApiResult<()> {
    match repo.find_post(post_id).await? {
        Some(_) => Ok(()),
        None => Err(invalid_reference("post", post_id)),
    }
}

/// Maps a foreign-key race (post deleted meanwhile) onto the same validation error.
fn post_reference_error(post_id: i64) -> impl FnOnce(RepoError) -> ApiError {
    move |e| match e {
        RepoError::ForeignKeyViolation => invalid_reference("post", post_id),
        other => other.into(),
    }
}

/// list_comments
///
/// [Public Route] Lists every comment, oldest first.
#[utoipa::path(
    get,
    path = "/comments/",
    responses((status = 200, description = "Comments", body = [CommentView]))
)]
pub async fn list_comments(State(state): State<AppState>) -> ApiResult<Json<Vec<CommentView>>> {
    policy::authorize(Action::CommentList, None)?;

    let comments = state
        .repo
        .list_comments(None)
        .await?
        .into_iter()
        .map(CommentView::from)
        .collect();
    Ok(Json(comments))
}

/// create_comment
///
/// [Authenticated Route] Comments on a post as the requesting user.
#[utoipa::path(
    post,
    path = "/comments/",
    request_body = CommentWriteRequest,
    responses(
        (status = 201, description = "Created", body = CommentView),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CommentWriteRequest>,
) -> ApiResult<(StatusCode, Json<CommentView>)> {
    policy::authorize(Action::CommentCreate, Some(&user))?;
    payload.validate()?;
    ensure_post(&state.repo, payload.post).await?;

    let comment = state
        .repo
        .create_comment(payload.post, user.id, payload.body)
        .await
        .map_err(post_reference_error(payload.post))?;

    tracing::info!(comment_id = comment.id, post_id = comment.post_id, "comment created");
    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// get_comment
///
/// [Public Route] Retrieves a single comment.
#[utoipa::path(
    get,
    path = "/comments/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Found", body = CommentView),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CommentView>> {
    policy::authorize(Action::CommentRetrieve, None)?;
    Ok(Json(load_comment(&state.repo, id).await?.into()))
}

async fn change_comment(
    state: &AppState,
    user: &AuthUser,
    action: Action,
    id: i64,
    payload: impl Validate + Into<CommentChanges>,
) -> ApiResult<Json<CommentView>> {
    policy::authorize(action, Some(user))?;

    let comment = load_comment(&state.repo, id).await?;
    policy::authorize_object(action, user, comment.owner_id)?;

    payload.validate()?;
    let changes: CommentChanges = payload.into();
    if let Some(post_id) = changes.post_id {
        ensure_post(&state.repo, post_id).await?;
    }

    let map_post_error = post_reference_error(changes.post_id.unwrap_or(comment.post_id));
    let comment = state
        .repo
        .update_comment(id, changes)
        .await
        .map_err(map_post_error)?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(comment_id = comment.id, action = ?action, "comment updated");
    Ok(Json(comment.into()))
}

/// update_comment
///
/// [Authenticated Route] Replaces a comment's writable fields. Owner only.
#[utoipa::path(
    put,
    path = "/comments/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = CommentWriteRequest,
    responses(
        (status = 200, description = "Updated", body = CommentView),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CommentWriteRequest>,
) -> ApiResult<Json<CommentView>> {
    change_comment(&state, &user, Action::CommentUpdate, id, payload).await
}

/// partial_update_comment
///
/// [Authenticated Route] Updates only the supplied fields. Owner only.
#[utoipa::path(
    patch,
    path = "/comments/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    request_body = CommentPatchRequest,
    responses(
        (status = 200, description = "Updated", body = CommentView),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn partial_update_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CommentPatchRequest>,
) -> ApiResult<Json<CommentView>> {
    change_comment(&state, &user, Action::CommentPartialUpdate, id, payload).await
}

/// delete_comment
///
/// [Authenticated Route] Deletes a comment. Owner only.
#[utoipa::path(
    delete,
    path = "/comments/{id}/",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let action = Action::CommentDestroy;
    policy::authorize(action, Some(&user))?;

    let comment = load_comment(&state.repo, id).await?;
    policy::authorize_object(action, &user, comment.owner_id)?;

    if !state.repo.delete_comment(id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(comment_id = id, "comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
