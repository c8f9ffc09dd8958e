use std::env;

/// Fallback signing secret for local runs and tests. Never accepted in production.
pub const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and pulled
/// into handlers and extractors from `AppState` via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    pub db_max_connections: u32,
    // Runtime environment marker. Controls fail-fast checks and the log format.
    pub env: Env,
    // HS256 secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    // Lifetime of tokens minted by `auth::issue_token`.
    pub token_ttl_seconds: i64,
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: `Local` tolerates missing infrastructure, `Production` refuses to start
/// without it.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking values for test state scaffolding.
    fn default() -> Self {
        Self {
            db_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// Reads a numeric variable, ignoring unparsable values.
fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables.
    ///
    /// # Panics
    /// Panics in `Production` when `DATABASE_URL` or `JWT_SECRET` is missing, so the service
    /// never starts with an in-memory store or a guessable signing key.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        Self {
            db_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            env,
            jwt_secret,
            token_ttl_seconds: parse_var("TOKEN_TTL_SECONDS")
                .filter(|ttl: &i64| *ttl > 0)
                .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
