use crate::models::{
    AuthorInfo, Comment, CommentView, CreatePostRequest, Post, PostDetail, PostResponse,
    UpdatePostRequest, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers interact
/// with the data layer through this trait only, so tests can substitute an
/// in-memory implementation.
///
/// Ownership-gated mutations (`update_post`, `delete_post`) take the acting
/// user id and match it inside the query itself — a single atomic conditional
/// statement, never a read-then-check-then-write sequence. A zero-row result
/// means "absent or not yours" and the two are indistinguishable by design.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    /// Finds an existing user colliding on email OR username, for the
    /// registration duplicate check.
    async fn find_user_conflict(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn get_all_users(&self) -> Result<Vec<User>, sqlx::Error>;

    // --- Posts ---
    async fn create_post(
        &self,
        author_id: Uuid,
        req: CreatePostRequest,
    ) -> Result<Post, sqlx::Error>;
    /// All posts with authors resolved, newest first.
    async fn list_posts(&self) -> Result<Vec<PostResponse>, sqlx::Error>;
    /// One post with author and comment authors resolved, comments oldest first.
    async fn get_post_detail(&self, id: Uuid) -> Result<Option<PostDetail>, sqlx::Error>;
    /// Bare existence lookup, used before appending comments.
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error>;
    /// Owner-only: updates only the row matching `(id, author_id)`.
    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error>;
    /// Owner-only: deletes only the row matching `(id, author_id)`.
    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error>;
    /// Admin override: deletes by id alone, no ownership filter.
    async fn delete_post_admin(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Comments ---
    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error>;
    /// Looks a comment up within its parent post. Used by the handlers to
    /// decide 404 vs 403 before mutating.
    async fn get_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, sqlx::Error>;
    async fn update_comment(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error>;
    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by Postgres.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance over the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// --- Join row shapes (internal) ---

/// A post row joined with its author's username.
#[derive(FromRow)]
struct PostAuthorRow {
    id: Uuid,
    author_id: Uuid,
    author_username: String,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostAuthorRow {
    fn into_response(self) -> PostResponse {
        PostResponse {
            id: self.id,
            title: self.title,
            content: self.content,
            author: AuthorInfo {
                id: self.author_id,
                username: self.author_username,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A comment row joined with its author's username.
#[derive(FromRow)]
struct CommentAuthorRow {
    id: Uuid,
    user_id: Uuid,
    author_username: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentAuthorRow {
    fn into_view(self) -> CommentView {
        CommentView {
            id: self.id,
            user: AuthorInfo {
                id: self.user_id,
                username: self.author_username,
            },
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, username, password_hash, is_admin, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, false, NOW(), NOW()) \
             RETURNING id, email, username, password_hash, is_admin, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, is_admin, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, is_admin, created_at, updated_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_conflict(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, is_admin, created_at, updated_at \
             FROM users WHERE email = $1 OR username = $2",
        )
        .bind(email)
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_all_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, is_admin, created_at, updated_at \
             FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    // --- POSTS ---

    async fn create_post(
        &self,
        author_id: Uuid,
        req: CreatePostRequest,
    ) -> Result<Post, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (id, author_id, title, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING id, author_id, title, content, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(req.title)
        .bind(req.content)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_posts(&self) -> Result<Vec<PostResponse>, sqlx::Error> {
        let rows = sqlx::query_as::<_, PostAuthorRow>(
            "SELECT p.id, p.author_id, u.username AS author_username, p.title, p.content, \
                    p.created_at, p.updated_at \
             FROM posts p JOIN users u ON p.author_id = u.id \
             ORDER BY p.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PostAuthorRow::into_response).collect())
    }

    async fn get_post_detail(&self, id: Uuid) -> Result<Option<PostDetail>, sqlx::Error> {
        let post = sqlx::query_as::<_, PostAuthorRow>(
            "SELECT p.id, p.author_id, u.username AS author_username, p.title, p.content, \
                    p.created_at, p.updated_at \
             FROM posts p JOIN users u ON p.author_id = u.id \
             WHERE p.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(post) = post else {
            return Ok(None);
        };

        let comments = sqlx::query_as::<_, CommentAuthorRow>(
            "SELECT c.id, c.user_id, u.username AS author_username, c.content, \
                    c.created_at, c.updated_at \
             FROM post_comments c JOIN users u ON c.user_id = u.id \
             WHERE c.post_id = $1 \
             ORDER BY c.created_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PostDetail {
            id: post.id,
            title: post.title,
            content: post.content,
            author: AuthorInfo {
                id: post.author_id,
                username: post.author_username,
            },
            comments: comments.into_iter().map(CommentAuthorRow::into_view).collect(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }))
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            "SELECT id, author_id, title, content, created_at, updated_at \
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        // Atomic conditional update: the ownership check is part of the WHERE
        // clause, so a non-owner cannot race the mutation. Zero rows means
        // absent or not theirs.
        sqlx::query_as::<_, Post>(
            "UPDATE posts \
             SET title = COALESCE($3, title), \
                 content = COALESCE($4, content), \
                 updated_at = NOW() \
             WHERE id = $1 AND author_id = $2 \
             RETURNING id, author_id, title, content, created_at, updated_at",
        )
        .bind(id)
        .bind(author_id)
        .bind(req.title)
        .bind(req.content)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post_admin(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- COMMENTS ---

    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO post_comments (id, post_id, user_id, content, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW(), NOW()) \
             RETURNING id, post_id, user_id, content, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, user_id, content, created_at, updated_at \
             FROM post_comments WHERE id = $1 AND post_id = $2",
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_comment(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        // Keyed single-row update; no whole-post rewrite, so concurrent edits
        // to sibling comments cannot clobber each other.
        sqlx::query_as::<_, Comment>(
            "UPDATE post_comments SET content = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, post_id, user_id, content, created_at, updated_at",
        )
        .bind(comment_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM post_comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
