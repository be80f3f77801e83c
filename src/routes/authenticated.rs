use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, put},
};

/// Authenticated Router Module
///
/// Routes for any caller with a resolved identity. The route gate redirects
/// anonymous page navigation to /sign-in before these are reached; the todo
/// handlers additionally resolve the caller through the `AuthUser` extractor
/// and apply per-item ownership checks, so API calls that slip past the gate
/// still answer 401/403 with proper JSON bodies.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /dashboard
        // The regular user's landing page. Admins are redirected away by the gate.
        .route("/dashboard", get(|| async { "Dashboard" }))
        // PUT/DELETE /api/todos/{id}
        // Owner-scoped mutation of a single todo item. Strict ownership check
        // is enforced within the handler logic.
        .route(
            "/api/todos/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
}
