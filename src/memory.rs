use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::models::{NewUser, Post, User};
use crate::repository::{RepoResult, Repository};

#[derive(Default)]
struct Tables {
    posts: BTreeMap<i64, Post>,
    users: BTreeMap<i64, User>,
    // Ids are never reused, matching BIGSERIAL.
    last_post_id: i64,
    last_user_id: i64,
}

/// InMemoryRepository
///
/// A `Repository` kept entirely in process memory. Used when running locally without
/// `DATABASE_URL` and as the store behind the HTTP tests. Every operation takes the lock
/// once, so each read-modify-write is atomic.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_posts(&self) -> RepoResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().cloned().collect())
    }

    async fn list_posts_page(&self, limit: i64, offset: i64) -> RepoResult<(Vec<Post>, i64)> {
        let tables = self.tables.read().await;
        let page = tables
            .posts
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, tables.posts.len() as i64))
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create_post(&self, title: &str) -> RepoResult<Post> {
        let mut tables = self.tables.write().await;
        tables.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: tables.last_post_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, title: &str) -> RepoResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        Ok(tables.posts.get_mut(&id).map(|post| {
            post.title = title.to_string();
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        Ok(self.tables.write().await.posts.remove(&id).is_some())
    }

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepositoryError::Conflict("email"));
        }

        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            name: user.name,
            email: user.email,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }
}
