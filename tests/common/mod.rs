#![allow(dead_code)]

use async_trait::async_trait;
use blog_api::{
    AppState,
    config::AppConfig,
    models::{
        AuthorInfo, Comment, CommentView, CreatePostRequest, Post, PostDetail, PostResponse,
        UpdatePostRequest, User,
    },
    repository::{Repository, RepositoryState},
};
use chrono::Utc;
use std::cmp::Reverse;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// Low bcrypt cost keeps seeded-fixture hashing fast; verify() reads the cost
// from the hash itself.
pub const TEST_BCRYPT_COST: u32 = 4;

/// In-memory implementation of the `Repository` trait. Backs the handler and
/// full-router tests without a live Postgres.
#[derive(Default)]
pub struct InMemoryRepository {
    pub users: Mutex<Vec<User>>,
    pub posts: Mutex<Vec<Post>>,
    pub comments: Mutex<Vec<Comment>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn author_info(&self, user_id: Uuid) -> AuthorInfo {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| AuthorInfo {
                id: u.id,
                username: u.username.clone(),
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_admin: false,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_conflict(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn get_all_users(&self) -> Result<Vec<User>, sqlx::Error> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_post(
        &self,
        author_id: Uuid,
        req: CreatePostRequest,
    ) -> Result<Post, sqlx::Error> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            title: req.title,
            content: req.content,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<PostResponse>, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by_key(|p| Reverse(p.created_at));
        Ok(posts
            .into_iter()
            .map(|p| PostResponse {
                author: self.author_info(p.author_id),
                id: p.id,
                title: p.title,
                content: p.content,
                created_at: p.created_at,
                updated_at: p.updated_at,
            })
            .collect())
    }

    async fn get_post_detail(&self, id: Uuid) -> Result<Option<PostDetail>, sqlx::Error> {
        let post = match self.posts.lock().unwrap().iter().find(|p| p.id == id) {
            Some(p) => p.clone(),
            None => return Ok(None),
        };

        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(Some(PostDetail {
            author: self.author_info(post.author_id),
            comments: comments
                .into_iter()
                .map(|c| CommentView {
                    user: self.author_info(c.user_id),
                    id: c.id,
                    content: c.content,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                })
                .collect(),
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }))
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        // Same conditional-match semantics as the SQL implementation: the row
        // must match both id and author.
        let Some(post) = posts.iter_mut().find(|p| p.id == id && p.author_id == author_id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(content) = req.content {
            post.content = content;
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| !(p.id == id && p.author_id == author_id));
        Ok(posts.len() < before)
    }

    async fn delete_post_admin(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Comment, sqlx::Error> {
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, sqlx::Error> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == comment_id && c.post_id == post_id)
            .cloned())
    }

    async fn update_comment(
        &self,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let mut comments = self.comments.lock().unwrap();
        let Some(comment) = comments.iter_mut().find(|c| c.id == comment_id) else {
            return Ok(None);
        };
        comment.content = content.to_string();
        comment.updated_at = Utc::now();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != comment_id);
        Ok(comments.len() < before)
    }
}

/// Builds an AppState over a fresh in-memory repository, with the default
/// (test) configuration.
pub fn test_state() -> (AppState, Arc<InMemoryRepository>) {
    let repo = Arc::new(InMemoryRepository::new());
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        config: AppConfig::default(),
    };
    (state, repo)
}

/// Seeds a user directly into the repository, bypassing the register handler.
pub fn seed_user(
    repo: &InMemoryRepository,
    email: &str,
    username: &str,
    password: &str,
    is_admin: bool,
) -> User {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        username: username.to_string(),
        password_hash: bcrypt::hash(password, TEST_BCRYPT_COST).unwrap(),
        is_admin,
        created_at: now,
        updated_at: now,
    };
    repo.users.lock().unwrap().push(user.clone());
    user
}

/// Seeds a post owned by the given author.
pub fn seed_post(repo: &InMemoryRepository, author_id: Uuid, title: &str, content: &str) -> Post {
    let now = Utc::now();
    let post = Post {
        id: Uuid::new_v4(),
        author_id,
        title: title.to_string(),
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    };
    repo.posts.lock().unwrap().push(post.clone());
    post
}

/// Seeds a comment on the given post.
pub fn seed_comment(
    repo: &InMemoryRepository,
    post_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> Comment {
    let now = Utc::now();
    let comment = Comment {
        id: Uuid::new_v4(),
        post_id,
        user_id,
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    };
    repo.comments.lock().unwrap().push(comment.clone());
    comment
}
