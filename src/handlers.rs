use crate::{
    AppState,
    auth::{AdminUser, AuthUser, Claims, issue_token},
    errors::ApiError,
    models::{
        Comment, CommentMutationResponse, CommentRequest, CreatePostRequest, LoginRequest,
        LoginResponse, LoginUser, MessageResponse, Post, PostDetail, PostResponse,
        RegisterRequest, RegisterResponse, RegisteredUser, UpdateCommentResponse,
        UpdatePostRequest, User,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// Salted one-way hash cost for stored passwords.
const BCRYPT_COST: u32 = 10;

// --- User Handlers ---

/// register_user
///
/// [Public Route] Creates a new account. Validates the email shape and
/// password length, rejects duplicate email/username naming the collided
/// field, and stores only the bcrypt hash of the password.
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email or username already exists")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email format".to_string()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if let Some(existing) = state
        .repo
        .find_user_conflict(&payload.email, &payload.username)
        .await?
    {
        let field = if existing.email == payload.email {
            "Email"
        } else {
            "Username"
        };
        return Err(ApiError::Conflict(format!("{field} already exists")));
    }

    let password_hash = bcrypt::hash(&payload.password, BCRYPT_COST)
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {e}")))?;

    let user = state
        .repo
        .create_user(&payload.email, &payload.username, &password_hash)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Successfully Registered".to_string(),
            user: RegisteredUser {
                id: user.id,
                email: user.email,
                username: user.username,
            },
        }),
    ))
}

/// login_user
///
/// [Public Route] Verifies the password against the stored hash and issues
/// the signed access token. An unknown email is 404; a wrong password for a
/// known email is 401 — a bad login, not a bad token.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Incorrect password"),
        (status = 404, description = "User not found")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .repo
        .get_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let password_correct = bcrypt::verify(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("failed to verify password: {e}")))?;

    if !password_correct {
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    let access_token = issue_token(&Claims::from(&user), &state.config.jwt_secret)?;

    Ok(Json(LoginResponse {
        access_token,
        user: LoginUser {
            id: user.id,
            email: user.email,
            is_admin: user.is_admin,
        },
    }))
}

/// get_profile
///
/// [Authenticated Route] Re-fetches the stored record behind the identity
/// claim. 404 if the user was deleted after the token was issued. The
/// password hash is excluded from serialization.
#[utoipa::path(
    get,
    path = "/users/profile",
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .repo
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// get_all_users
///
/// [Admin Route] Lists every account, hashes excluded.
#[utoipa::path(
    get,
    path = "/users/",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_all_users(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.repo.get_all_users().await?))
}

// --- Post Handlers ---

/// create_post
///
/// [Authenticated Route] Persists a new post. The author is the authenticated
/// identity, never client-supplied.
#[utoipa::path(
    post,
    path = "/posts/createPost",
    request_body = CreatePostRequest,
    responses((status = 201, description = "Created", body = Post))
)]
pub async fn create_post(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.repo.create_post(claims.sub, payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// get_all_posts
///
/// [Public Route] Lists all posts, authors resolved to display names,
/// newest first.
#[utoipa::path(
    get,
    path = "/posts/getAllPosts",
    responses((status = 200, description = "All posts", body = [PostResponse]))
)]
pub async fn get_all_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostResponse>>, ApiError> {
    Ok(Json(state.repo.list_posts().await?))
}

/// get_post
///
/// [Public Route] One post with author and comment authors resolved.
#[utoipa::path(
    get,
    path = "/posts/getSpecificPost/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostDetail),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = state
        .repo
        .get_post_detail(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// update_post
///
/// [Authenticated Route] Owner-only edit. The repository matches
/// `(id, author_id)` in one conditional statement; zero rows means the post
/// is absent or belongs to someone else, and the response does not say which.
#[utoipa::path(
    patch,
    path = "/posts/updatePost/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not found or not the author")
    )
)]
pub async fn update_post(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .repo
        .update_post(post_id, claims.sub, payload)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(
                "Post not found or you are not authorized to update this post".to_string(),
            )
        })?;

    Ok(Json(post))
}

/// delete_post
///
/// [Authenticated Route] Owner-only delete with the same conditional-match
/// semantics as update.
#[utoipa::path(
    delete,
    path = "/posts/deletePost/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found or not the author")
    )
)]
pub async fn delete_post(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_post(post_id, claims.sub).await? {
        return Err(ApiError::NotFound(
            "Post not found or you are not authorized to delete this post".to_string(),
        ));
    }

    Ok(Json(MessageResponse {
        message: "Post deleted successfully".to_string(),
    }))
}

/// admin_delete_post
///
/// [Admin Route] Admin override: deletes any post by id, no ownership filter.
#[utoipa::path(
    delete,
    path = "/posts/adminDeletePost/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Post not found")
    )
)]
pub async fn admin_delete_post(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.repo.delete_post_admin(post_id).await? {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Post deleted by admin successfully".to_string(),
    }))
}

// --- Comment Handlers ---

/// Re-reads the full post detail after a comment mutation. The parent post
/// was just seen, so absence here means it raced a delete.
async fn reload_post(state: &AppState, post_id: Uuid) -> Result<PostDetail, ApiError> {
    state
        .repo
        .get_post_detail(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

/// add_comment
///
/// [Authenticated Route] Appends a comment authored by the identity to an
/// existing post and returns the updated post.
#[utoipa::path(
    post,
    path = "/posts/addComment/{postId}",
    params(("postId" = Uuid, Path, description = "Post ID")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment added", body = PostDetail),
        (status = 404, description = "Post not found")
    )
)]
pub async fn add_comment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<PostDetail>, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    state
        .repo
        .add_comment(post_id, claims.sub, &payload.content)
        .await?;

    Ok(Json(reload_post(&state, post_id).await?))
}

/// Shared lookup for comment mutations: 404 if the post or the comment is
/// absent, in that order, so the caller learns which one was missing.
async fn find_comment(
    state: &AppState,
    post_id: Uuid,
    comment_id: Uuid,
) -> Result<Comment, ApiError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    state
        .repo
        .get_comment(post_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

/// delete_comment
///
/// [Authenticated Route] Removes a comment. Permitted for the comment's
/// author or any admin; an authenticated non-author non-admin gets 403, not
/// 404 — the comment's existence is already public via the post detail.
#[utoipa::path(
    delete,
    path = "/posts/{postId}/comments/{commentId}",
    params(
        ("postId" = Uuid, Path, description = "Post ID"),
        ("commentId" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = CommentMutationResponse),
        (status = 403, description = "Not the author and not an admin"),
        (status = 404, description = "Post or comment not found")
    )
)]
pub async fn delete_comment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CommentMutationResponse>, ApiError> {
    let comment = find_comment(&state, post_id, comment_id).await?;

    // Owner OR admin — either alone is sufficient.
    if comment.user_id != claims.sub && !claims.is_admin {
        return Err(ApiError::Forbidden(
            "Unauthorized to delete this comment".to_string(),
        ));
    }

    state.repo.delete_comment(comment_id).await?;

    Ok(Json(CommentMutationResponse {
        message: "Comment deleted successfully".to_string(),
        post: reload_post(&state, post_id).await?,
    }))
}

/// admin_delete_comment
///
/// [Admin Route] Identical lookup and removal, no ownership check — the
/// admin guard on the route already cleared the caller.
#[utoipa::path(
    delete,
    path = "/posts/adminDeleteComment/{postId}/comments/{commentId}",
    params(
        ("postId" = Uuid, Path, description = "Post ID"),
        ("commentId" = Uuid, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = CommentMutationResponse),
        (status = 404, description = "Post or comment not found")
    )
)]
pub async fn admin_delete_comment(
    AdminUser(_claims): AdminUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<CommentMutationResponse>, ApiError> {
    find_comment(&state, post_id, comment_id).await?;

    state.repo.delete_comment(comment_id).await?;

    Ok(Json(CommentMutationResponse {
        message: "Comment deleted by admin successfully".to_string(),
        post: reload_post(&state, post_id).await?,
    }))
}

/// update_comment
///
/// [Authenticated Route] Edits a comment's content. Strictly owner-only:
/// admins may delete others' comments but may not edit them.
#[utoipa::path(
    patch,
    path = "/posts/{postId}/updateComment/{commentId}",
    params(
        ("postId" = Uuid, Path, description = "Post ID"),
        ("commentId" = Uuid, Path, description = "Comment ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated", body = UpdateCommentResponse),
        (status = 400, description = "Empty content"),
        (status = 403, description = "Not the comment author"),
        (status = 404, description = "Post or comment not found")
    )
)]
pub async fn update_comment(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<UpdateCommentResponse>, ApiError> {
    if payload.content.is_empty() {
        return Err(ApiError::BadRequest(
            "Comment content is required".to_string(),
        ));
    }

    let comment = find_comment(&state, post_id, comment_id).await?;

    if comment.user_id != claims.sub {
        return Err(ApiError::Forbidden(
            "Unauthorized to update this comment".to_string(),
        ));
    }

    let updated_comment = state
        .repo
        .update_comment(comment_id, &payload.content)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    Ok(Json(UpdateCommentResponse {
        message: "Comment updated successfully".to_string(),
        updated_comment,
        post: reload_post(&state, post_id).await?,
    }))
}
