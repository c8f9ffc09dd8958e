use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Core Application Schemas (Mapped to Database) ---

/// Post
///
/// A record from the `posts` table. This is the only resource exposed by the CRUD endpoints;
/// its JSON shape (`id`, `title`, `created_at`, `updated_at`) is the public contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    // Store-assigned, never changes after creation.
    pub id: i64,
    pub title: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // Bumped on every mutation.
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// User
///
/// The authenticated principal, stored in the `users` table. Tokens carry its `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Already-validated input for the repository's `create_user`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

// --- Request Payloads (Input Schemas) ---

/// PostPayload
///
/// Body of `POST /posts` and `PUT /posts/{id}`.
///
/// The field is kept as a raw JSON value so that a missing title, a `null`, a number and an
/// empty string all reach the validator and come back as a 422 naming `title`, instead of
/// being rejected earlier by the deserializer.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Default)]
pub struct PostPayload {
    #[schema(value_type = Option<String>, example = "Post de prueba")]
    pub title: Option<Value>,
}

/// RegisterUserRequest
///
/// Body of the public `POST /register` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Default)]
pub struct RegisterUserRequest {
    #[schema(value_type = Option<String>, example = "Ada")]
    pub name: Option<Value>,
    #[schema(value_type = Option<String>, example = "ada@example.com")]
    pub email: Option<Value>,
}

/// ListQuery
///
/// Optional paging parameters for `GET /posts`. When both are absent the whole
/// collection is returned. Blank or non-numeric values count as absent.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number.
    #[serde(default, deserialize_with = "lenient_number")]
    pub page: Option<u32>,
    /// Page size, clamped to 1..=100.
    #[serde(default, deserialize_with = "lenient_number")]
    pub per_page: Option<u32>,
}

/// Paging hints never fail a listing: anything that is not an unsigned number is dropped.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

// --- Response Schemas (Output) ---

/// PostCollection
///
/// Wrapper returned by `GET /posts`. The `data` key is part of the public contract.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostCollection {
    pub data: Vec<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub meta: Option<PageMeta>,
}

/// Paging metadata, present only on paginated listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    pub last_page: u32,
}

/// RegisterResponse
///
/// Output of `POST /register`: the new user plus a bearer token for it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterResponse {
    pub user: User,
    pub api_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}
