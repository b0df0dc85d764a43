use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Authenticated Router Module
///
/// Routes for any caller holding a valid credential. The router is wrapped in
/// the authentication middleware one layer up, so every handler here receives
/// a validated identity claim and uses it for the Owner-Only checks
/// (`update_post`, `delete_post`, comment ownership).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/profile
        // The identity's stored record, re-fetched; hash excluded.
        .route("/users/profile", get(handlers::get_profile))
        // POST /posts/createPost
        // Author is always the authenticated identity.
        .route("/posts/createPost", post(handlers::create_post))
        // PATCH /posts/updatePost/{postId}
        // Owner-only; absence and ownership mismatch both answer 404.
        .route("/posts/updatePost/{postId}", patch(handlers::update_post))
        // DELETE /posts/deletePost/{postId}
        // Owner-only, same conditional-match semantics.
        .route("/posts/deletePost/{postId}", delete(handlers::delete_post))
        // POST /posts/addComment/{postId}
        // Any authenticated user may comment on an existing post.
        .route("/posts/addComment/{postId}", post(handlers::add_comment))
        // DELETE /posts/{postId}/comments/{commentId}
        // Comment author or admin; others get 403.
        .route(
            "/posts/{postId}/comments/{commentId}",
            delete(handlers::delete_comment),
        )
        // PATCH /posts/{postId}/updateComment/{commentId}
        // Strictly the comment author; admins are not exempt.
        .route(
            "/posts/{postId}/updateComment/{commentId}",
            patch(handlers::update_comment),
        )
}
