use crate::{
    AppState,
    auth::{self, AuthUser},
    error::{ApiError, RepositoryError},
    models::{
        ListQuery, NewUser, PageMeta, Post, PostCollection, PostPayload, RegisterResponse,
        RegisterUserRequest, User,
    },
    validation::{self, ValidationErrors},
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::de::DeserializeOwned;

/// Page size used when only `page` is supplied.
pub const DEFAULT_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 100;

// --- Extraction helpers ---

/// parse_body
///
/// Decodes a JSON body. An empty body is read as `{}` so that a request without a payload
/// fails validation (422) rather than parsing (400).
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// An id that does not parse can never match a row, so it is a 404 like any unknown id.
fn post_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::NotFound("post"))
}

// --- Post Handlers ---

/// list_posts
///
/// [Authenticated Route] Lists posts wrapped in `{"data": [...]}`.
/// With `page` or `per_page` the listing is paginated and carries a `meta` block.
#[utoipa::path(
    get,
    path = "/posts",
    params(ListQuery),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "All posts", body = PostCollection),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<PostCollection>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if query.page.is_none() && query.per_page.is_none() {
        let data = state.repo.list_posts().await?;
        tracing::debug!(count = data.len(), "listed posts");
        return Ok(Json(PostCollection { data, meta: None }));
    }

    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let current_page = query.page.unwrap_or(1).max(1);
    let offset = i64::from(current_page - 1) * i64::from(per_page);

    let (data, total) = state
        .repo
        .list_posts_page(i64::from(per_page), offset)
        .await?;

    let last_page = ((total + i64::from(per_page) - 1) / i64::from(per_page)).max(1);

    Ok(Json(PostCollection {
        data,
        meta: Some(PageMeta {
            current_page,
            per_page,
            total,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }),
    }))
}

/// create_post
///
/// [Authenticated Route] Validates the title and persists a new post.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = PostPayload,
    security(("bearer_token" = [])),
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 401, description = "Unauthenticated"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_post(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let payload: PostPayload = parse_body(&body)?;
    let title = validation::validate_post(&payload)?;

    let post = state.repo.create_post(&title).await?;
    tracing::info!(post_id = post.id, user_id = user.id, "post created");

    Ok((StatusCode::CREATED, Json(post)))
}

/// show_post
///
/// [Authenticated Route] Retrieves a single post. Unknown ids are a 404.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn show_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Post>, ApiError> {
    let id = post_id(id)?;
    state
        .repo
        .find_post(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("post"))
}

/// update_post
///
/// [Authenticated Route] Replaces the title of an existing post.
///
/// The existence check runs before validation, so an unknown id is a 404 even with an
/// invalid body.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = PostPayload,
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_post(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Bytes,
) -> Result<Json<Post>, ApiError> {
    let id = post_id(id)?;
    if state.repo.find_post(id).await?.is_none() {
        return Err(ApiError::NotFound("post"));
    }

    let payload: PostPayload = parse_body(&body)?;
    let title = validation::validate_post(&payload)?;

    // The row can vanish between the lookup and the write.
    let post = state
        .repo
        .update_post(id, &title)
        .await?
        .ok_or(ApiError::NotFound("post"))?;
    tracing::info!(post_id = post.id, user_id = user.id, "post updated");

    Ok(Json(post))
}

/// delete_post
///
/// [Authenticated Route] Removes a post. 204 with an empty body on success.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    security(("bearer_token" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = post_id(id)?;
    if state.repo.delete_post(id).await? {
        tracing::info!(post_id = id, user_id = user.id, "post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("post"))
    }
}

// --- User Handlers ---

/// register_user
///
/// [Public Route] Creates a user and returns a bearer token for it.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = RegisterResponse),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let payload: RegisterUserRequest = parse_body(&body)?;
    let (name, email) = validation::validate_registration(&payload)?;

    let user = match state.repo.create_user(NewUser { name, email }).await {
        Ok(user) => user,
        Err(RepositoryError::Conflict(field)) => {
            return Err(ValidationErrors::single(
                field,
                format!("The {field} has already been taken."),
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    let api_token = auth::issue_token(user.id, &state.config)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user,
            api_token,
            token_type: "Bearer".to_string(),
            expires_in: state.config.token_ttl_seconds,
        }),
    ))
}

/// get_me
///
/// [Authenticated Route] Returns the authenticated user's record.
#[utoipa::path(
    get,
    path = "/me",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Profile", body = User),
        (status = 401, description = "Unauthenticated")
    )
)]
pub async fn get_me(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    state
        .repo
        .get_user(user.id)
        .await?
        .map(Json)
        .ok_or(ApiError::Unauthorized)
}
