use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{
        AdminListQuery, AdminListResponse, DeleteTodoResponse, Todo, UpdateTodoRequest,
        UserWithTodos, WebhookAck,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

/// Fixed page size of the admin listing endpoint.
const ITEMS_PER_PAGE: i64 = 10;

/// update_todo
///
/// [Authenticated Route] PUT /api/todos/{id}. Flips the completion flag of a
/// todo the caller owns and returns the updated record.
///
/// *Authorization ladder*: resolved caller (else 401, via the extractor),
/// existing todo (else 404), then ownership (else 403). The ownership check
/// deliberately runs after the existence check, matching the documented
/// disclosure nuance: a non-owner learns the item exists.
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(("id" = String, Path, description = "Todo ID")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Updated", body = Todo),
        (status = 400, description = "Missing ID"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_todo(
    AuthUser { id: caller_id }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::MissingId);
    }

    let todo = state
        .repo
        .get_todo(&id)
        .await?
        .ok_or(ApiError::NotFound("Todo"))?;

    if todo.user_id != caller_id {
        return Err(ApiError::Forbidden);
    }

    let updated = state
        .repo
        .set_todo_completed(&id, payload.completed)
        .await?
        // The row vanished between lookup and update; treat as not found.
        .ok_or(ApiError::NotFound("Todo"))?;

    Ok(Json(updated))
}

/// delete_todo
///
/// [Authenticated Route] DELETE /api/todos/{id}. Removes a todo the caller
/// owns and returns a confirmation message. Same authorization ladder as
/// `update_todo`.
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = String, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Deleted", body = DeleteTodoResponse),
        (status = 400, description = "Missing ID"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_todo(
    AuthUser { id: caller_id }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTodoResponse>, ApiError> {
    if id.trim().is_empty() {
        return Err(ApiError::MissingId);
    }

    let todo = state
        .repo
        .get_todo(&id)
        .await?
        .ok_or(ApiError::NotFound("Todo"))?;

    if todo.user_id != caller_id {
        return Err(ApiError::Forbidden);
    }

    if !state.repo.delete_todo(&id).await? {
        return Err(ApiError::NotFound("Todo"));
    }

    Ok(Json(DeleteTodoResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}

/// admin_list_todos
///
/// [Admin Route] GET /api/admin?email=&page=. Looks up a user by email together
/// with one page of their todos (newest first, fixed page size of 10) and the
/// total page count.
///
/// *RBAC*: the caller's role is resolved fresh through the same identity
/// provider capability the route gate uses; anything but admin is 401.
///
/// No email filter (or no matching user) yields a null user and zero total
/// pages. That is an empty result by design, not an error.
#[utoipa::path(
    get,
    path = "/api/admin",
    params(AdminListQuery),
    responses(
        (status = 200, description = "User with todo page", body = AdminListResponse),
        (status = 401, description = "Not an admin"),
        (status = 500, description = "Persistence failure")
    )
)]
pub async fn admin_list_todos(
    AuthUser { id: caller_id }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<AdminListResponse>, ApiError> {
    let role = state.identity.resolve_role(&caller_id).await?;
    if !role.is_admin() {
        return Err(ApiError::Unauthorized);
    }

    let current_page = query.page.unwrap_or(1).max(1);

    let email = query.email.as_deref().filter(|e| !e.is_empty());
    let Some(email) = email else {
        return Ok(Json(AdminListResponse {
            user: None,
            total_pages: 0,
            current_page,
        }));
    };

    let user = state.repo.get_user_by_email(email).await?;
    let total_items = state.repo.count_todos_by_email(email).await?;
    let total_pages = (total_items + ITEMS_PER_PAGE - 1) / ITEMS_PER_PAGE;

    // Saturate instead of multiplying raw, a ?page in the trillions must not
    // panic the worker. The offset simply lands past the last row.
    let offset = current_page.saturating_sub(1).saturating_mul(ITEMS_PER_PAGE);

    let user = match user {
        None => None,
        Some(user) => {
            let todos = state
                .repo
                .get_todo_page(&user.id, ITEMS_PER_PAGE, offset)
                .await?;
            Some(UserWithTodos::new(user, todos))
        }
    };

    Ok(Json(AdminListResponse {
        user,
        total_pages,
        current_page,
    }))
}

/// register_webhook
///
/// [Public Route] POST /api/webhook/register. Accepts any JSON body and
/// acknowledges receipt without validating or persisting anything. Placeholder
/// for future signature verification and event processing.
#[utoipa::path(
    post,
    path = "/api/webhook/register",
    responses((status = 200, description = "Acknowledged", body = WebhookAck))
)]
pub async fn register_webhook(Json(_payload): Json<serde_json::Value>) -> Json<WebhookAck> {
    Json(WebhookAck { received: true })
}
