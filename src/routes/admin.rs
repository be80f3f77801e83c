use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes restricted to admin callers. Access control is two-layered: the
/// route gate redirects non-admins away from the /admin page tree, and the
/// listing handler re-resolves the caller's role through the identity provider
/// before touching any data.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/dashboard
        // The admin landing page the gate redirects admins to.
        .route("/admin/dashboard", get(|| async { "Admin dashboard" }))
        // GET /api/admin?email=&page=
        // Paginated lookup of a user's todos by email. Role check happens in
        // the handler; the gate's /admin prefix rule covers pages only.
        .route("/api/admin", get(handlers::admin_list_todos))
}
