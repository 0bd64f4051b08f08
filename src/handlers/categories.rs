use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult, RepoError},
    models::{Category, CreateCategoryRequest},
    policy::{self, Action},
};

/// list_categories
///
/// [Public Route] Lists every category. Categories are not paginated.
#[utoipa::path(
    get,
    path = "/categories/",
    responses((status = 200, description = "All categories", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    policy::authorize(Action::CategoryList, None)?;
    Ok(Json(state.repo.list_categories().await?))
}

/// create_category
///
/// [Public Route] Creates a category. Open to anonymous callers; categories
/// have no owner and no update or delete surface.
#[utoipa::path(
    post,
    path = "/categories/",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 400, description = "Invalid or duplicate name")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    policy::authorize(Action::CategoryCreate, None)?;
    payload.validate()?;

    let category = state
        .repo
        .create_category(payload.name)
        .await
        .map_err(|e| match e {
            RepoError::UniqueViolation => {
                ApiError::Validation("name: category with this name already exists.".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(category_id = category.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}
