use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The page routes exist mostly as
/// redirect targets for the route gate; the webhook stub is the only public
/// API surface.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Landing page. Authenticated visitors never see it: the gate bounces
        // them to their role-appropriate dashboard.
        .route("/", get(|| async { "Todo Portal" }))
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET /sign-in, /sign-up
        // Session pages; the actual session flow lives with the identity provider.
        .route("/sign-in", get(|| async { "Sign in" }))
        .route("/sign-up", get(|| async { "Sign up" }))
        // GET /error
        // Where the gate sends a request when the role lookup fails.
        .route("/error", get(|| async { "Something went wrong" }))
        // POST /api/webhook/register
        // Acknowledges provider webhooks without processing them.
        .route("/api/webhook/register", post(handlers::register_webhook))
}
