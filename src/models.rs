use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The RBAC claim attached to a user by the identity provider. The provider is
/// authoritative; the `users.role` column is only a denormalized copy. Anything
/// that is not the literal `admin` claim is treated as a regular user, which is
/// exactly how the authorization middleware reasons about roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    User,
}

// Lenient on input: an unrecognized claim value means "not an admin", never a
// deserialization failure.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse(&raw))
    }
}

impl Role {
    pub fn parse(s: &str) -> Role {
        if s == "admin" { Role::Admin } else { Role::User }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// The role column is plain TEXT; decode it through the same lenient parser the
// middleware uses rather than a Postgres enum type.
impl sqlx::Type<sqlx::Postgres> for Role {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Role {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Role::parse(raw))
    }
}

/// User
///
/// The user's canonical identity record in the `users` table. The primary key is
/// the identifier issued by the external identity provider at signup, which keeps
/// both systems in sync without a mapping table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    // Primary key, issued by the identity provider.
    pub id: String,
    // The user's primary identifier for humans; unique.
    pub email: String,
    // Denormalized provider role claim; absent means regular user.
    pub role: Option<Role>,
}

/// Todo
///
/// A single to-do item from the `todos` table, owned by exactly one user.
/// Serialized in camelCase to match the JSON contract of the web frontend.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Todo {
    pub id: String,
    // FK to users.id (owner).
    pub user_id: String,
    pub completed: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// UpdateTodoRequest
///
/// Input payload for PUT /api/todos/{id}. The completion flag is the only
/// field a caller may change through this endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTodoRequest {
    pub completed: bool,
}

/// AdminListQuery
///
/// Query parameters accepted by GET /api/admin. `page` is 1-based; the page
/// size is fixed server-side.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams, Default)]
pub struct AdminListQuery {
    /// Exact email of the user whose todos should be listed.
    pub email: Option<String>,
    /// 1-based page number, defaults to 1.
    pub page: Option<i64>,
}

// --- Response Schemas (Output) ---

/// UserWithTodos
///
/// A user record together with one page of their todos, newest first. This is
/// the embedded shape the admin listing endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserWithTodos {
    pub id: String,
    pub email: String,
    pub role: Option<Role>,
    pub todos: Vec<Todo>,
}

impl UserWithTodos {
    pub fn new(user: User, todos: Vec<Todo>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            todos,
        }
    }
}

/// AdminListResponse
///
/// Output schema for GET /api/admin. `user` is null when no email filter was
/// given or no user matched it; that is an empty result, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminListResponse {
    pub user: Option<UserWithTodos>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// DeleteTodoResponse
///
/// Confirmation body returned by DELETE /api/todos/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeleteTodoResponse {
    pub message: String,
}

/// WebhookAck
///
/// Acknowledgment body of the webhook registration stub.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct WebhookAck {
    pub received: bool,
}
