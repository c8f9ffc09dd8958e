//! Router Module Index
//!
//! Routing is split by access level so that authentication is applied once, as a layer on
//! the whole authenticated group, instead of per handler.

/// Routes reachable without a token.
pub mod public;

/// Routes behind the `AuthUser` middleware. Every request without a valid token is a 401.
pub mod authenticated;
