use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a credential: account creation, login, and
/// read-only post access.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /users/register
        .route("/users/register", post(handlers::register_user))
        // POST /users/login
        // Issues the signed access token on success.
        .route("/users/login", post(handlers::login_user))
        // GET /posts/getAllPosts
        // All posts, authors resolved, newest first.
        .route("/posts/getAllPosts", get(handlers::get_all_posts))
        // GET /posts/getSpecificPost/{postId}
        // One post with its comment thread.
        .route(
            "/posts/getSpecificPost/{postId}",
            get(handlers::get_post),
        )
}
