use crate::error::RepositoryError;
use crate::models::{NewUser, Post, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// The persistence contract used by handlers and the auth extractor. Handlers only see
/// `Arc<dyn Repository>`, so Postgres, the in-memory store and test mocks are interchangeable.
///
/// Lookups return `Ok(None)` / `Ok(false)` for a missing row; `Err` is reserved for store
/// failures.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Posts ---
    /// Every post, ascending by id.
    async fn list_posts(&self) -> RepoResult<Vec<Post>>;
    /// One page of posts, ascending by id, plus the total row count.
    async fn list_posts_page(&self, limit: i64, offset: i64) -> RepoResult<(Vec<Post>, i64)>;
    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>>;
    async fn create_post(&self, title: &str) -> RepoResult<Post>;
    // Sets the title and bumps updated_at. None when the id does not exist.
    async fn update_post(&self, id: i64, title: &str) -> RepoResult<Option<Post>>;
    // true if a row was removed.
    async fn delete_post(&self, id: i64) -> RepoResult<bool>;

    // --- Users ---
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;
    /// Fails with `RepositoryError::Conflict("email")` when the address is taken.
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. The schema lives in `./migrations`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_posts(&self) -> RepoResult<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, title, created_at, updated_at FROM posts ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    /// list_posts_page
    ///
    /// Two statements (page + count) outside a transaction; under concurrent writes the total
    /// may be off by the rows changed in between, which is acceptable for paging metadata.
    async fn list_posts_page(&self, limit: i64, offset: i64) -> RepoResult<(Vec<Post>, i64)> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, title, created_at, updated_at FROM posts ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;

        Ok((posts, total))
    }

    async fn find_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, created_at, updated_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn create_post(&self, title: &str) -> RepoResult<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, created_at, updated_at)
            VALUES ($1, NOW(), NOW())
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(post)
    }

    async fn update_post(&self, id: i64, title: &str) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn delete_post(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict("email")
            }
            other => RepositoryError::Database(other),
        })
    }
}
