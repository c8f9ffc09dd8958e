use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, error::ApiError, repository::RepositoryState};

/// Claims
///
/// Payload of the bearer tokens minted by `issue_token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id, as a string per RFC 7519.
    pub sub: String,
    /// Expiration time (seconds since the epoch).
    pub exp: usize,
    /// Issued at (seconds since the epoch).
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Inserted into request extensions by
/// the auth middleware, so handlers read it with `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize)]
struct TokenQuery {
    api_token: Option<String>,
}

/// issue_token
///
/// Signs a token for `user_id`, valid for `config.token_ttl_seconds`.
pub fn issue_token(user_id: i64, config: &AppConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + config.token_ttl_seconds.max(0) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// bearer_token
///
/// Pulls the raw token out of the request: `Authorization: Bearer <token>` first, then the
/// `api_token` query parameter. A present but non-Bearer `Authorization` header does not fall
/// back to the query string.
fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        return value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
    }

    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.api_token)
        .filter(|token| !token.is_empty())
}

/// Verifies signature and expiry, returning the user id from `sub`.
pub fn verify_token(token: &str, config: &AppConfig) -> Option<i64> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // Tokens are short-lived; no clock skew allowance.
    validation.leeway = 0;

    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    match decode::<Claims>(token, &key, &validation) {
        Ok(data) => data.claims.sub.parse().ok(),
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            None
        }
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Token extraction (header, then query string).
/// 2. JWT signature and expiry verification.
/// 3. Store lookup, so tokens of deleted users stop working.
///
/// Rejection: `ApiError::Unauthorized` (401) on any failure; a store failure is a 500.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let user_id = verify_token(&token, &config).ok_or(ApiError::Unauthorized)?;

        let user = repo
            .get_user(user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            name: user.name,
        })
    }
}
