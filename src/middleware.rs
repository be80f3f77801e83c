use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{AppState, auth::session_user_id, config::RouteGateConfig, models::Role};

/// GateDecision
///
/// Outcome of the route gate for one request: let it through to the matched
/// handler, or short-circuit with a redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

/// classify_route
///
/// The authorization decision table, first matching rule wins. `caller` is the
/// caller's resolved role, or None for an unauthenticated request. Role lookup
/// failures are handled by the middleware before this function is reached.
///
/// 1. Excluded path (assets, docs) -> allow.
/// 2. Unauthenticated + public path -> allow.
/// 3. Unauthenticated + private path -> redirect to sign-in.
/// 4. Admin landing on the user dashboard -> redirect to the admin dashboard.
/// 5. Non-admin anywhere under the admin tree -> redirect to the user dashboard.
/// 6. Authenticated caller on a public page -> redirect to their landing page.
///    Public API paths (the webhook) pass through, a session must not turn a
///    JSON call into a 303.
/// 7. Otherwise -> allow.
pub fn classify_route(gate: &RouteGateConfig, path: &str, caller: Option<Role>) -> GateDecision {
    if gate.is_excluded(path) {
        return GateDecision::Allow;
    }

    let Some(role) = caller else {
        if gate.is_public(path) {
            return GateDecision::Allow;
        }
        return GateDecision::Redirect(gate.sign_in_path.clone());
    };

    if role.is_admin() && path == gate.user_landing {
        return GateDecision::Redirect(gate.admin_landing.clone());
    }

    if !role.is_admin() && path.starts_with(&gate.admin_prefix) {
        return GateDecision::Redirect(gate.user_landing.clone());
    }

    if gate.is_public(path) && !gate.is_api(path) {
        return GateDecision::Redirect(gate.landing_for(role.is_admin()).to_string());
    }

    GateDecision::Allow
}

/// route_gate
///
/// The authorization middleware, evaluated once per inbound request before any
/// route logic. Resolves the session from headers, fetches the caller's role
/// fresh from the identity provider (no caching), and applies the decision
/// table. A failed role lookup redirects to the generic error page rather than
/// silently allowing or denying.
pub async fn route_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let gate = &state.config.gate;
    let path = request.uri().path().to_string();

    // Skip early so excluded paths never cost an identity provider round trip.
    if gate.is_excluded(&path) {
        return next.run(request).await;
    }

    let caller = session_user_id(request.headers(), &state.config);

    let role = match caller {
        None => None,
        Some(user_id) => match state.identity.resolve_role(&user_id).await {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::error!("role lookup failed for {user_id}: {err}");
                return Redirect::to(&gate.error_path).into_response();
            }
        },
    };

    match classify_route(gate, &path, role) {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(target) => {
            tracing::debug!("gate redirect {path} -> {target}");
            Redirect::to(&target).into_response()
        }
    }
}
