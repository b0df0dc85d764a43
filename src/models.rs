use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record stored in the `users` table. The password hash is
/// carried for login verification but is never serialized into any response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // Unique login identifier.
    pub email: String,
    // Unique display name, resolved into post/comment author fields.
    pub username: String,
    /// Salted bcrypt hash. Excluded from every serialized payload.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    #[schema(ignore)]
    pub password_hash: String,
    // The two-tier authorization flag: admins may override ownership checks.
    pub is_admin: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Post
///
/// A blog post row from the `posts` table. Comments live in their own keyed
/// table (`post_comments`) so ownership-gated mutations stay atomic per row.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    // FK to users.id (Owner). Ownership checks match against this column.
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Comment
///
/// A comment row from the `post_comments` table. The id is unique within the
/// parent post (primary key), which is what per-comment mutations key on.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    // FK to users.id (comment author).
    pub user_id: Uuid,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /users/register. The plaintext password is hashed
/// before storage and never persisted or logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// LoginRequest
///
/// Input payload for POST /users/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreatePostRequest
///
/// Input payload for POST /posts/createPost. The author is always the
/// authenticated identity, never part of the payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// UpdatePostRequest
///
/// Partial update payload for PATCH /posts/updatePost/{postId}. `Option<T>`
/// fields leave omitted columns untouched (COALESCE in the repository query).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// CommentRequest
///
/// Input payload for adding or editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentRequest {
    pub content: String,
}

// --- Response Schemas (Output) ---

/// AuthorInfo
///
/// A user reference resolved to its display name, embedded in post and
/// comment responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AuthorInfo {
    pub id: Uuid,
    pub username: String,
}

/// PostResponse
///
/// A post with its author resolved. Used by the list endpoint, which does not
/// carry comments.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorInfo,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CommentView
///
/// A comment with its author resolved to a display name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentView {
    pub id: Uuid,
    pub user: AuthorInfo,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// PostDetail
///
/// A single post with author and comment authors resolved; comments are
/// ordered oldest first. Returned by the detail endpoint and by every comment
/// mutation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorInfo,
    pub comments: Vec<CommentView>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// RegisteredUser
///
/// Public fields echoed back after registration. Never includes the hash.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// RegisterResponse
///
/// Body of a successful POST /users/register (201).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

/// LoginUser
///
/// Identity fields returned alongside the issued credential.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
}

/// LoginResponse
///
/// Body of a successful POST /users/login (200).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: LoginUser,
}

/// MessageResponse
///
/// Body of operations whose success payload is a confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// CommentMutationResponse
///
/// Body of comment delete operations: confirmation plus the updated post.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CommentMutationResponse {
    pub message: String,
    pub post: PostDetail,
}

/// UpdateCommentResponse
///
/// Body of PATCH updateComment: the edited comment plus the updated post.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCommentResponse {
    pub message: String,
    pub updated_comment: Comment,
    pub post: PostDetail,
}
