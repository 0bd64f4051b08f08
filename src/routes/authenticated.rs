use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post, put},
};

/// Authenticated Router Module
///
/// Routes reachable only with a resolved `AuthUser`. The layer applied in
/// `create_router` rejects anonymous callers with 401 before any handler runs;
/// ownership is then checked per row inside the handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /posts/
        // Creates a post; the owner is always the caller.
        .route("/posts/", post(handlers::posts::create_post))
        // PUT/PATCH/DELETE /posts/{id}/
        // Owner-only mutation.
        .route(
            "/posts/{id}/",
            put(handlers::posts::update_post)
                .patch(handlers::posts::partial_update_post)
                .delete(handlers::posts::delete_post),
        )
        // POST /posts/{id}/add_to_liked/ and DELETE /posts/{id}/remove_from_liked/
        // Explicit like/unlike pair; each fails on the wrong prior state.
        .route("/posts/{id}/add_to_liked/", post(handlers::posts::add_to_liked))
        .route(
            "/posts/{id}/remove_from_liked/",
            delete(handlers::posts::remove_from_liked),
        )
        // POST /posts/{id}/favorite_action/
        // Toggle: adds when absent, removes when present.
        .route(
            "/posts/{id}/favorite_action/",
            post(handlers::posts::favorite_action),
        )
        // POST /comments/
        .route("/comments/", post(handlers::comments::create_comment))
        // PUT/PATCH/DELETE /comments/{id}/
        // Owner-only mutation.
        .route(
            "/comments/{id}/",
            put(handlers::comments::update_comment)
                .patch(handlers::comments::partial_update_comment)
                .delete(handlers::comments::delete_comment),
        )
}
