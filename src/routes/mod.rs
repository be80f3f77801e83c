/// Router Module Index
///
/// Organizes the application's routing into the three access tiers the route
/// gate middleware reasons about. The gate runs ahead of all of them; the
/// handlers still verify identity and role themselves, so no route depends on
/// the gate alone.

/// Routes in the public-route set: pages reachable without a session plus the
/// webhook stub.
pub mod public;

/// Routes requiring a resolved caller identity (the user dashboard and the
/// per-owner todo API).
pub mod authenticated;

/// Routes restricted to callers the identity provider marks as admin.
pub mod admin;
