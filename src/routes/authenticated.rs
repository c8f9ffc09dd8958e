use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Authenticated Router Module
///
/// The Post resource and the caller's profile. The auth middleware is attached by
/// `create_router`, so every handler here can rely on `Extension<AuthUser>` being present.
/// There is no ownership model: any authenticated user may act on any post.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        .route("/me", get(handlers::get_me))
        // GET/POST /posts
        // Collection listing (optionally paginated) and creation.
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        // GET/PUT/DELETE /posts/{id}
        .route(
            "/posts/{id}",
            get(handlers::show_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
}
