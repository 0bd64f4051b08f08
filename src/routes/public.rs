use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints open to anonymous callers. Methods on the same paths that need
/// an identity live in `authenticated` and are merged in alongside.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET/POST /categories/
        // Categories are open for both listing and creation.
        .route(
            "/categories/",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        // GET /posts/?search=&owner=&category=&page=&page_size=
        // Paginated post listing, newest first.
        .route("/posts/", get(handlers::posts::list_posts))
        // GET /posts/{id}/
        // Detail shape with category, comments and like count expanded.
        .route("/posts/{id}/", get(handlers::posts::get_post))
        // GET /posts/{id}/comments/
        .route("/posts/{id}/comments/", get(handlers::posts::get_post_comments))
        // GET /posts/{id}/get_likes/
        .route("/posts/{id}/get_likes/", get(handlers::posts::get_likes))
        // GET /comments/ and GET /comments/{id}/
        .route("/comments/", get(handlers::comments::list_comments))
        .route("/comments/{id}/", get(handlers::comments::get_comment))
}
