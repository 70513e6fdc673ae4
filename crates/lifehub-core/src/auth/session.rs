use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::Storage;
use crate::models::UserProfile;

/// Storage key holding the raw bearer token
pub const TOKEN_KEY: &str = "lifehub_token";

/// Path of the "who am I" endpoint, relative to the API base
const ME_PATH: &str = "auth/me";

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<UserProfile>,
}

/// Why a session could not be confirmed by the backend.
#[derive(Error, Debug)]
pub enum SessionCheckError {
    #[error("No token to check")]
    NoToken,

    #[error("Session rejected by server: {0}")]
    Rejected(StatusCode),

    #[error("Could not reach server: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Malformed profile response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Token changed while the check was in flight")]
    Superseded,
}

/// The single authoritative session of a running client.
///
/// Holds the bearer token and the profile resolved for it. Only the methods
/// on this type change either of them; everything else reads. Share it with
/// `Arc` between the API client and the navigation guard.
pub struct SessionStore {
    storage: Arc<dyn Storage>,
    http: Client,
    api_base: String,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Create the session, picking up a token persisted by an earlier run.
    pub fn load(storage: Arc<dyn Storage>, api_base: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("lifehub/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let token = match storage.read(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token, starting logged out");
                None
            }
        };
        debug!(has_token = token.is_some(), "Session loaded");

        Ok(Self {
            storage,
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            state: RwLock::new(SessionState { token, user: None }),
        })
    }

    /// Base URL every API path is resolved against.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// HTTP client shared with the API client. Cloning is cheap.
    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub fn token(&self) -> Option<String> {
        self.read_state().token.clone()
    }

    /// Profile fetched for the current token, if any.
    pub fn user(&self) -> Option<UserProfile> {
        self.read_state().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state()
            .token
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// Replace the token. `None` or an empty string logs out.
    ///
    /// Persistence is best-effort: a failing store is logged and the
    /// in-memory session still changes.
    pub fn set_token(&self, new_token: Option<&str>) {
        match new_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                self.write_state().token = Some(token.to_string());
                if let Err(e) = self.storage.write(TOKEN_KEY, token) {
                    warn!(error = %e, "Failed to persist token");
                }
                debug!("Token updated");
            }
            None => {
                {
                    let mut state = self.write_state();
                    state.token = None;
                    state.user = None;
                }
                if let Err(e) = self.storage.remove(TOKEN_KEY) {
                    warn!(error = %e, "Failed to remove persisted token");
                }
                debug!("Token cleared");
            }
        }
    }

    pub fn logout(&self) {
        info!("Logging out");
        self.set_token(None);
    }

    /// Ask the backend who the current token belongs to.
    ///
    /// Any failure ends the session: the token and profile are cleared and
    /// `None` is returned. Makes no request when there is no token.
    pub async fn fetch_user(&self) -> Option<UserProfile> {
        match self.verify().await {
            Ok(profile) => Some(profile),
            Err(SessionCheckError::NoToken) => None,
            Err(e) => {
                debug!(reason = %e, "Profile fetch did not produce a user");
                None
            }
        }
    }

    /// Same as [`fetch_user`](Self::fetch_user) but keeps the failure reason.
    pub async fn verify(&self) -> Result<UserProfile, SessionCheckError> {
        let token = self.token().ok_or(SessionCheckError::NoToken)?;

        match self.request_profile(&token).await {
            Ok(profile) => {
                let mut state = self.write_state();
                if state.token.as_deref() != Some(token.as_str()) {
                    return Err(SessionCheckError::Superseded);
                }
                state.user = Some(profile.clone());
                debug!(user_id = profile.id, "Session confirmed");
                Ok(profile)
            }
            Err(e) => {
                warn!(reason = %e, "Session check failed");
                if self.token().as_deref() == Some(token.as_str()) {
                    self.logout();
                } else {
                    debug!("Token replaced during check, keeping the new one");
                }
                Err(e)
            }
        }
    }

    async fn request_profile(&self, token: &str) -> Result<UserProfile, SessionCheckError> {
        let url = format!("{}/{}", self.api_base, ME_PATH);
        let response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionCheckError::Rejected(status));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use serde_json::json;
    use wiremock::matchers::{any, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Storage whose writes always fail
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow::anyhow!("disk on fire"))
        }
        fn write(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow::anyhow!("disk on fire"))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(anyhow::anyhow!("disk on fire"))
        }
    }

    fn session_with(storage: Arc<MemoryStorage>, base: &str) -> SessionStore {
        SessionStore::load(storage, base).expect("Failed to create session")
    }

    #[test]
    fn test_set_token_roundtrip() {
        let storage = Arc::new(MemoryStorage::new());
        let session = session_with(storage.clone(), "http://localhost/api");

        session.set_token(Some("abc"));
        assert_eq!(session.token().as_deref(), Some("abc"));
        assert!(session.is_authenticated());
        assert_eq!(storage.read(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        session.set_token(Some(""));
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());
        assert_eq!(storage.read(TOKEN_KEY).unwrap(), None);

        session.set_token(Some("def"));
        session.set_token(None);
        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());

        // Clearing twice is harmless
        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_token_loaded_from_storage() {
        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "persisted"));
        let session = session_with(storage, "http://localhost/api");
        assert_eq!(session.token().as_deref(), Some("persisted"));
        assert!(session.is_authenticated());
        assert!(session.user().is_none());

        let empty = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, ""));
        assert!(!session_with(empty, "http://localhost/api").is_authenticated());
    }

    #[test]
    fn test_storage_failures_do_not_block_session() {
        let session = SessionStore::load(Arc::new(BrokenStorage), "http://localhost/api")
            .expect("Failed to create session");
        assert!(!session.is_authenticated());

        session.set_token(Some("abc"));
        assert_eq!(session.token().as_deref(), Some("abc"));

        session.logout();
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_fetch_user_without_token_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_with(Arc::new(MemoryStorage::new()), &format!("{}/api", server.uri()));
        assert!(session.fetch_user().await.is_none());
        assert!(matches!(session.verify().await, Err(SessionCheckError::NoToken)));
    }

    #[tokio::test]
    async fn test_fetch_user_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("Authorization", "Bearer good"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Ana"})))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "good"));
        let session = session_with(storage, &format!("{}/api", server.uri()));

        let user = session.fetch_user().await.expect("Expected a profile");
        assert_eq!(user.id, 1);
        assert_eq!(user.extra.get("name"), Some(&json!("Ana")));
        assert_eq!(session.user(), Some(user));
        assert_eq!(session.token().as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn test_fetch_user_unauthorized_logs_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Token inválido o expirado"))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "stale"));
        let session = session_with(storage.clone(), &format!("{}/api", server.uri()));

        assert!(session.fetch_user().await.is_none());
        assert_eq!(session.token(), None);
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());
        assert_eq!(storage.read(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejected_token_clears_cached_user() {
        let server = MockServer::start().await;
        Mock::given(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Ana"})))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "good"));
        let session = session_with(storage.clone(), &format!("{}/api", server.uri()));
        assert!(session.fetch_user().await.is_some());
        assert!(session.user().is_some());

        // Token expires server-side
        server.reset().await;
        Mock::given(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        assert!(session.fetch_user().await.is_none());
        assert!(session.user().is_none());
        assert_eq!(session.token(), None);
        assert_eq!(storage.read(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_clearing_token_clears_cached_user() {
        let server = MockServer::start().await;
        Mock::given(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .mount(&server)
            .await;

        let session = session_with(
            Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "good")),
            &format!("{}/api", server.uri()),
        );

        assert!(session.fetch_user().await.is_some());
        session.set_token(Some(""));
        assert!(session.user().is_none());
        assert!(!session.is_authenticated());

        session.set_token(Some("good"));
        assert!(session.fetch_user().await.is_some());
        session.logout();
        assert!(session.user().is_none());
        assert_eq!(session.token(), None);
    }

    #[tokio::test]
    async fn test_token_replaced_during_check_is_kept() {
        let server = MockServer::start().await;
        Mock::given(path("/api/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 1}))
                    .set_delay(std::time::Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "old"));
        let session = session_with(storage.clone(), &format!("{}/api", server.uri()));

        let replace_token = async {
            // Wait until the profile request for "old" has reached the server
            while server.received_requests().await.unwrap_or_default().is_empty() {
                tokio::task::yield_now().await;
            }
            session.set_token(Some("new"));
        };
        let (result, ()) = tokio::join!(session.verify(), replace_token);

        assert!(matches!(result, Err(SessionCheckError::Superseded)));
        assert_eq!(session.token().as_deref(), Some("new"));
        assert!(session.user().is_none());
        assert_eq!(storage.read(TOKEN_KEY).unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_verify_reports_rejection_status() {
        let server = MockServer::start().await;
        Mock::given(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "stale"));
        let session = session_with(storage, &format!("{}/api", server.uri()));

        match session.verify().await {
            Err(SessionCheckError::Rejected(status)) => assert_eq!(status, StatusCode::FORBIDDEN),
            other => panic!("Expected rejection, got {:?}", other),
        }
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_fetch_user_malformed_body_logs_out() {
        let server = MockServer::start().await;
        Mock::given(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "abc"));
        let session = session_with(storage, &format!("{}/api", server.uri()));

        assert!(matches!(session.verify().await, Err(SessionCheckError::Malformed(_))));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_fetch_user_network_failure_logs_out() {
        // Nothing listens on port 1
        let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "abc"));
        let session = session_with(storage.clone(), "http://127.0.0.1:1/api");

        assert!(session.fetch_user().await.is_none());
        assert!(!session.is_authenticated());
        assert_eq!(storage.read(TOKEN_KEY).unwrap(), None);
    }
}
