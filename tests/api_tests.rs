use chrono::{Duration, Utc};
use std::sync::Arc;
use todo_portal::{
    AppState,
    config::AppConfig,
    create_router,
    identity::{IdentityState, MockIdentityService},
    models::{Role, Todo, User},
    repository::{MemoryRepository, RepositoryState},
};
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

/// Boots the full router (gate, observability layers, swagger) on a random
/// port, backed by the in-memory repository and identity mock.
async fn spawn_app(repo: MemoryRepository, identity: MockIdentityService) -> TestApp {
    let state = AppState {
        repo: Arc::new(repo) as RepositoryState,
        identity: Arc::new(identity) as IdentityState,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

fn seeded_repo() -> MemoryRepository {
    let mut repo = MemoryRepository::new().with_user(User {
        id: "user_owner".to_string(),
        email: "owner@example.com".to_string(),
        role: Some(Role::User),
    });
    for i in 1..=12 {
        repo = repo.with_todo(Todo {
            id: format!("t{i}"),
            user_id: "user_owner".to_string(),
            completed: false,
            created_at: Utc::now() - Duration::seconds(i),
        });
    }
    repo
}

fn seeded_identity() -> MockIdentityService {
    MockIdentityService::new()
        .with_user("user_owner", "owner@example.com", Some(Role::User))
        .with_user("user_admin", "admin@example.com", Some(Role::Admin))
}

/// Client that does not follow redirects, so the gate's Location headers are
/// observable.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app(MemoryRepository::new(), MockIdentityService::new()).await;

    let response = client()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
}

#[tokio::test]
async fn webhook_registration_always_acknowledges() {
    let app = spawn_app(MemoryRepository::new(), MockIdentityService::new()).await;

    let response = client()
        .post(format!("{}/api/webhook/register", app.address))
        .json(&serde_json::json!({ "anything": ["goes", 42] }))
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "received": true }));
}

#[tokio::test]
async fn webhook_acknowledges_even_with_a_session_attached() {
    let app = spawn_app(seeded_repo(), seeded_identity()).await;

    let response = client()
        .post(format!("{}/api/webhook/register", app.address))
        .header("x-user-id", "user_owner")
        .json(&serde_json::json!({ "type": "user.created" }))
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "received": true }));
}

#[tokio::test]
async fn anonymous_dashboard_request_is_redirected_to_sign_in() {
    let app = spawn_app(MemoryRepository::new(), MockIdentityService::new()).await;

    let response = client()
        .get(format!("{}/dashboard", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()["location"], "/sign-in");
}

#[tokio::test]
async fn owner_updates_todo_end_to_end() {
    let app = spawn_app(seeded_repo(), seeded_identity()).await;

    let response = client()
        .put(format!("{}/api/todos/t1", app.address))
        .header("x-user-id", "user_owner")
        .json(&serde_json::json!({ "completed": true }))
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "t1");
    assert_eq!(body["userId"], "user_owner");
    assert_eq!(body["completed"], true);
}

#[tokio::test]
async fn deleting_unknown_todo_returns_not_found_body() {
    let app = spawn_app(seeded_repo(), seeded_identity()).await;

    let response = client()
        .delete(format!("{}/api/todos/ghost", app.address))
        .header("x-user-id", "user_owner")
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Todo not found" }));
}

#[tokio::test]
async fn non_admin_listing_request_is_unauthorized() {
    let app = spawn_app(seeded_repo(), seeded_identity()).await;

    let response = client()
        .get(format!(
            "{}/api/admin?email=owner@example.com",
            app.address
        ))
        .header("x-user-id", "user_owner")
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn admin_listing_returns_embedded_todo_page() {
    let app = spawn_app(seeded_repo(), seeded_identity()).await;

    let response = client()
        .get(format!(
            "{}/api/admin?email=owner@example.com&page=1",
            app.address
        ))
        .header("x-user-id", "user_admin")
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["currentPage"], 1);
    assert_eq!(body["totalPages"], 2, "12 items at 10 per page");
    assert_eq!(body["user"]["email"], "owner@example.com");
    assert_eq!(body["user"]["todos"].as_array().unwrap().len(), 10);
    // Newest todo first.
    assert_eq!(body["user"]["todos"][0]["id"], "t1");
}

#[tokio::test]
async fn admin_listing_with_unknown_email_is_empty_not_an_error() {
    let app = spawn_app(seeded_repo(), seeded_identity()).await;

    let response = client()
        .get(format!(
            "{}/api/admin?email=missing@example.com",
            app.address
        ))
        .header("x-user-id", "user_admin")
        .send()
        .await
        .expect("req fail");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["user"], serde_json::Value::Null);
    assert_eq!(body["totalPages"], 0);
}
