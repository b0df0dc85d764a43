use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get},
};

/// Admin Router Module
///
/// Routes requiring the administrator flag. Each handler takes the
/// `AdminUser` extractor, which authenticates and then rejects non-admin
/// identities with 403 before any business logic runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /users/
        // Every account, hashes excluded.
        .route("/users/", get(handlers::get_all_users))
        // DELETE /posts/adminDeletePost/{postId}
        // Admin override: matches by id only, bypassing the author filter.
        .route(
            "/posts/adminDeletePost/{postId}",
            delete(handlers::admin_delete_post),
        )
        // DELETE /posts/adminDeleteComment/{postId}/comments/{commentId}
        // Admin override for comment removal; no ownership check.
        .route(
            "/posts/adminDeleteComment/{postId}/comments/{commentId}",
            delete(handlers::admin_delete_comment),
        )
}
