use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::models::Role;

/// IdentityError
///
/// Failures of the external identity provider. The middleware turns any of
/// these into a redirect to the error page; handlers collapse them into a
/// generic internal error.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider returned {status} for user {user_id}")]
    Status { status: u16, user_id: String },
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// IdentityUser
///
/// The user record as the identity provider sees it. The role claim lives in
/// the provider's user metadata and may be absent, in which case the caller is
/// a regular user.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct IdentityUser {
    pub id: String,
    pub email: String,
    pub role: Option<Role>,
}

/// IdentityService
///
/// Abstract contract for the external identity provider. The trait is what lets
/// the real HTTP client (HttpIdentityClient) be swapped for the in-memory mock
/// (MockIdentityService) in tests without touching the middleware or handlers.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Fetches the provider's user record for a resolved caller id.
    async fn get_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError>;

    /// Resolves the caller's effective role, fetched fresh on every call.
    ///
    /// This is the single role-resolution capability shared by the route gate
    /// and the admin listing handler. A missing role claim means `Role::User`.
    async fn resolve_role(&self, user_id: &str) -> Result<Role, IdentityError> {
        Ok(self.get_user(user_id).await?.role.unwrap_or(Role::User))
    }
}

/// IdentityState
///
/// The concrete type used to share identity provider access across the application state.
pub type IdentityState = Arc<dyn IdentityService>;

// Wire shape of the provider's user endpoint. The role claim is nested under
// public metadata, mirroring how hosted identity providers attach custom claims.
#[derive(Deserialize)]
struct ProviderUser {
    id: String,
    email: String,
    #[serde(default)]
    public_metadata: ProviderMetadata,
}

#[derive(Deserialize, Default)]
struct ProviderMetadata {
    role: Option<Role>,
}

/// HttpIdentityClient
///
/// The real implementation, talking to the provider's management API over HTTPS
/// with a server-side API key.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpIdentityClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityClient {
    async fn get_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
        let url = format!("{}/v1/users/{}", self.base_url, user_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Status {
                status: response.status().as_u16(),
                user_id: user_id.to_string(),
            });
        }

        let provider_user = response.json::<ProviderUser>().await?;

        Ok(IdentityUser {
            id: provider_user.id,
            email: provider_user.email,
            role: provider_user.public_metadata.role,
        })
    }
}

/// MockIdentityService
///
/// In-memory implementation of `IdentityService` used for unit and integration
/// testing. Holds a fixed set of users and can simulate a provider outage.
#[derive(Clone, Default)]
pub struct MockIdentityService {
    users: HashMap<String, IdentityUser>,
    /// When true, every lookup returns a simulated failure.
    pub should_fail: bool,
}

impl MockIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            users: HashMap::new(),
            should_fail: true,
        }
    }

    pub fn with_user(mut self, id: &str, email: &str, role: Option<Role>) -> Self {
        self.users.insert(
            id.to_string(),
            IdentityUser {
                id: id.to_string(),
                email: email.to_string(),
                role,
            },
        );
        self
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn get_user(&self, user_id: &str) -> Result<IdentityUser, IdentityError> {
        if self.should_fail {
            return Err(IdentityError::Unavailable(
                "mock outage requested".to_string(),
            ));
        }
        self.users
            .get(user_id)
            .cloned()
            .ok_or(IdentityError::Status {
                status: 404,
                user_id: user_id.to_string(),
            })
    }
}
