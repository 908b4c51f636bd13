//! Identity provider HTTP client (GoTrue-compatible REST API).

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::{AuthBackend, SessionEvent};
use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::models::{Role, User};
use crate::storage::{PROVIDER_SESSION_KEY, Storage};

/// Shown after sign-up when the provider waits for email confirmation.
pub const CONFIRM_EMAIL_MESSAGE: &str = "Check your email to confirm your account, then sign in";

/// Tokens and user returned by the token and signup endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: ProviderUser,
}

/// User object as the provider returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProviderUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Value,
    #[serde(default)]
    app_metadata: Value,
}

fn metadata_str(section: &Value, key: &str) -> Option<String> {
    section
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl ProviderUser {
    fn to_user(&self) -> User {
        let email = self.email.clone().unwrap_or_default();
        let name = metadata_str(&self.user_metadata, "full_name")
            .or_else(|| metadata_str(&self.user_metadata, "name"))
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let role = metadata_str(&self.user_metadata, "role")
            .or_else(|| metadata_str(&self.app_metadata, "role"))
            .and_then(|r| Role::parse(&r))
            .unwrap_or_default();

        User {
            id: self.id.clone(),
            email,
            name,
            role,
            avatar: metadata_str(&self.user_metadata, "avatar_url"),
        }
    }
}

/// Identity provider backend.
///
/// Session tokens live in storage under `provider_session`. Sign-in,
/// sign-up, refresh and sign-out are published as [`SessionEvent`]s.
pub struct ProviderAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    storage: Arc<dyn Storage>,
    events: broadcast::Sender<SessionEvent>,
}

impl ProviderAuth {
    pub fn new(config: &ProviderConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            storage,
            events,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{base}{path}", base = self.base_url))
            .header("apikey", &self.anon_key)
    }

    fn load_session(&self) -> Option<Session> {
        let raw = self.storage.get(PROVIDER_SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Discarding malformed provider session: {}", e);
                None
            }
        }
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        self.storage.set(PROVIDER_SESSION_KEY, &serde_json::to_string(session)?)
    }

    fn publish(&self, event: SessionEvent) {
        // No receivers yet is fine.
        let _ = self.events.send(event);
    }

    /// Current user for `access_token`, or `None` when the token is rejected.
    async fn fetch_user(&self, access_token: &str) -> Result<Option<ProviderUser>> {
        let response = self
            .request(Method::GET, "/auth/v1/user")
            .bearer_auth(access_token)
            .send()
            .await?;
        if token_rejected(response.status()) {
            return Ok(None);
        }
        Ok(Some(ensure_success(response).await?.json().await?))
    }

    /// Exchange a refresh token, or `None` when the provider rejects it.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<Session>> {
        let response = self
            .request(Method::POST, "/auth/v1/token?grant_type=refresh_token")
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        // An unknown or used refresh token comes back as 400 invalid_grant.
        if token_rejected(response.status()) || response.status() == StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        let session: Session = ensure_success(response).await?.json().await?;
        self.save_session(&session)?;
        self.publish(SessionEvent::TokenRefreshed);
        Ok(Some(session))
    }
}

impl AuthBackend for ProviderAuth {
    async fn restore(&self) -> Result<Option<User>> {
        let Some(mut session) = self.load_session() else {
            self.storage.remove(PROVIDER_SESSION_KEY)?;
            return Ok(None);
        };

        match self.fetch_user(&session.access_token).await? {
            Some(user) => session.user = user,
            None => {
                debug!("Access token rejected, trying refresh");
                let refreshed = match session.refresh_token.as_deref() {
                    Some(token) => self.refresh(token).await?,
                    None => None,
                };
                match refreshed {
                    Some(fresh) => session = fresh,
                    None => {
                        info!("Provider session expired");
                        self.storage.remove(PROVIDER_SESSION_KEY)?;
                        return Ok(None);
                    }
                }
            }
        }

        self.save_session(&session)?;
        let user = session.user.to_user();
        self.publish(SessionEvent::UserUpdated(user.clone()));
        Ok(Some(user))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .request(Method::POST, "/auth/v1/token?grant_type=password")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let session: Session = ensure_success(response).await?.json().await?;

        self.save_session(&session)?;
        let user = session.user.to_user();
        info!("Provider sign-in: {}", user.email);
        self.publish(SessionEvent::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User> {
        let response = self
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": name },
            }))
            .send()
            .await?;
        let body: Value = ensure_success(response).await?.json().await?;

        // With email confirmation enabled the provider returns a bare user.
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            self.save_session(&session)?;
            let user = session.user.to_user();
            self.publish(SessionEvent::SignedIn(user.clone()));
            Ok(user)
        } else {
            info!("Provider sign-up pending confirmation: {}", email);
            Err(AppError::auth(CONFIRM_EMAIL_MESSAGE))
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let result = match self.load_session() {
            Some(session) => match self
                .request(Method::POST, "/auth/v1/logout")
                .bearer_auth(&session.access_token)
                .send()
                .await
            {
                Ok(response) => ensure_success(response).await.map(|_| ()),
                Err(e) => Err(e.into()),
            },
            None => Ok(()),
        };

        self.storage.remove(PROVIDER_SESSION_KEY)?;
        self.publish(SessionEvent::SignedOut);
        result
    }

    fn session_events(&self) -> Option<broadcast::Receiver<SessionEvent>> {
        Some(self.events.subscribe())
    }
}

/// Provider refused the token itself, as opposed to failing to answer.
fn token_rejected(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Turn a non-2xx response into an auth error carrying the provider's message.
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::auth(error_message(status, &body)))
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthModel;
    use crate::storage::{AUTH_USER_KEY, MemoryStorage};
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn provider_user(value: Value) -> ProviderUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_map_user_with_full_metadata() {
        let user = provider_user(json!({
            "id": "8f1c",
            "email": "m.rousseau@radioanalysis.com",
            "user_metadata": {
                "full_name": "Marie Rousseau",
                "role": "analyst",
                "avatar_url": "https://cdn.example/m.png"
            },
            "app_metadata": { "role": "admin" }
        }))
        .to_user();

        assert_eq!(user.id, "8f1c");
        assert_eq!(user.name, "Marie Rousseau");
        assert_eq!(user.role, Role::Analyst);
        assert_eq!(user.avatar.as_deref(), Some("https://cdn.example/m.png"));
    }

    #[test]
    fn test_map_user_fallbacks() {
        let user = provider_user(json!({
            "id": "77aa",
            "email": "t.nakamura@radioanalysis.com",
            "user_metadata": null,
            "app_metadata": { "role": "ADMIN" }
        }))
        .to_user();
        assert_eq!(user.name, "t.nakamura");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.avatar, None);

        let user = provider_user(json!({
            "id": "77ab",
            "email": "guest@radioanalysis.com",
            "user_metadata": { "name": "Guest", "role": "superuser" }
        }))
        .to_user();
        assert_eq!(user.name, "Guest");
        assert_eq!(user.role, Role::Viewer);
    }

    #[test]
    fn test_error_message_field_priority() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_message(status, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(status, r#"{"msg":"Signups not allowed"}"#), "Signups not allowed");
        assert_eq!(error_message(status, r#"{"message":"Rate limited"}"#), "Rate limited");
        assert_eq!(error_message(status, r#"{"error":"invalid_grant"}"#), "invalid_grant");
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "Request failed with status 502 Bad Gateway"
        );
    }

    #[test]
    fn test_session_storage_shape() {
        let session: Session = serde_json::from_value(json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1771230000,
            "refresh_token": "rt",
            "user": { "id": "8f1c", "email": "a@b.c" }
        }))
        .unwrap();

        let auth = ProviderAuth::new(
            &ProviderConfig {
                url: "https://auth.example/".to_string(),
                anon_key: "anon".to_string(),
                timeout_secs: 5,
            },
            Arc::new(MemoryStorage::new()),
        )
        .unwrap();
        assert_eq!(auth.base_url, "https://auth.example");

        auth.save_session(&session).unwrap();
        let loaded = auth.load_session().unwrap();
        assert_eq!(loaded.access_token, "at");
        assert_eq!(loaded.refresh_token.as_deref(), Some("rt"));
        assert_eq!(loaded.user.to_user().email, "a@b.c");
    }

    #[tokio::test]
    async fn test_restore_without_session() {
        let storage = Arc::new(MemoryStorage::new());
        let auth = ProviderAuth::new(
            &ProviderConfig {
                url: "http://127.0.0.1:9".to_string(),
                anon_key: "anon".to_string(),
                timeout_secs: 1,
            },
            storage,
        )
        .unwrap();
        assert_eq!(auth.restore().await.unwrap(), None);
        assert!(auth.sign_out().await.is_ok());
    }

    /// Canned reply for one request line such as `GET /auth/v1/user`.
    struct Route {
        target: &'static str,
        status: u16,
        body: String,
    }

    fn route(target: &'static str, status: u16, body: impl Into<String>) -> Route {
        Route {
            target,
            status,
            body: body.into(),
        }
    }

    /// Serve `routes` on a local port. Returns the base URL and the request lines seen.
    async fn serve(routes: Vec<Route>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let request = read_request(&mut stream).await;
                let target = request
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .split_whitespace()
                    .take(2)
                    .collect::<Vec<_>>()
                    .join(" ");
                log.lock().unwrap().push(target.clone());

                let (status, body) = routes
                    .iter()
                    .find(|r| r.target == target)
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, "{}".to_string()));
                let reply = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n{body}",
                    len = body.len()
                );
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), seen)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn session_body(access_token: &str) -> String {
        json!({
            "access_token": access_token,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": {
                "id": "8f1c",
                "email": "m.rousseau@radioanalysis.com",
                "user_metadata": { "full_name": "Marie Rousseau", "role": "analyst" }
            }
        })
        .to_string()
    }

    fn backend(base_url: &str, storage: Arc<MemoryStorage>) -> ProviderAuth {
        ProviderAuth::new(
            &ProviderConfig {
                url: base_url.to_string(),
                anon_key: "anon".to_string(),
                timeout_secs: 5,
            },
            storage,
        )
        .unwrap()
    }

    fn stored_token(storage: &MemoryStorage) -> Option<String> {
        let raw = storage.get(PROVIDER_SESSION_KEY)?;
        let session: Session = serde_json::from_str(&raw).unwrap();
        Some(session.access_token)
    }

    fn seen_count(seen: &Mutex<Vec<String>>, target: &str) -> usize {
        seen.lock().unwrap().iter().filter(|t| *t == target).count()
    }

    #[tokio::test]
    async fn test_sign_in_stores_provider_session_only() {
        let (url, _) = serve(vec![route(
            "POST /auth/v1/token?grant_type=password",
            200,
            session_body("at"),
        )])
        .await;
        let storage = Arc::new(MemoryStorage::new());
        let auth = backend(&url, storage.clone());
        let mut events = auth.session_events().unwrap();

        let user = auth.sign_in("m.rousseau@radioanalysis.com", "secret").await.unwrap();
        assert_eq!(user.name, "Marie Rousseau");
        assert_eq!(user.role, Role::Analyst);
        assert_eq!(stored_token(&storage).as_deref(), Some("at"));
        assert_eq!(storage.get(AUTH_USER_KEY), None);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedIn(user));
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_and_publishes() {
        let (url, seen) = serve(vec![route("POST /auth/v1/logout", 204, "")]).await;
        let storage = Arc::new(MemoryStorage::new());
        storage.set(PROVIDER_SESSION_KEY, &session_body("at")).unwrap();
        let auth = backend(&url, storage.clone());
        let mut events = auth.session_events().unwrap();

        auth.sign_out().await.unwrap();
        assert_eq!(storage.get(PROVIDER_SESSION_KEY), None);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
        assert_eq!(seen_count(&seen, "POST /auth/v1/logout"), 1);
    }

    #[tokio::test]
    async fn test_login_error_body_reaches_state() {
        let (url, _) = serve(vec![route(
            "POST /auth/v1/token?grant_type=password",
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )])
        .await;
        let storage = Arc::new(MemoryStorage::new());
        let model = AuthModel::new(backend(&url, storage.clone()), false);

        assert!(!model.login("m.rousseau@radioanalysis.com", "wrong").await);
        assert_eq!(model.error().as_deref(), Some("Invalid login credentials"));
        assert!(!model.is_authenticated());
        assert_eq!(storage.get(PROVIDER_SESSION_KEY), None);
    }

    #[tokio::test]
    async fn test_restore_refreshes_rejected_token_once() {
        let (url, seen) = serve(vec![
            route("GET /auth/v1/user", 401, r#"{"msg":"invalid JWT"}"#),
            route("POST /auth/v1/token?grant_type=refresh_token", 200, session_body("at2")),
        ])
        .await;
        let storage = Arc::new(MemoryStorage::new());
        storage.set(PROVIDER_SESSION_KEY, &session_body("at")).unwrap();
        let auth = backend(&url, storage.clone());
        let mut events = auth.session_events().unwrap();

        let user = auth.restore().await.unwrap().unwrap();
        assert_eq!(user.id, "8f1c");
        assert_eq!(stored_token(&storage).as_deref(), Some("at2"));
        assert_eq!(seen_count(&seen, "POST /auth/v1/token?grant_type=refresh_token"), 1);
        assert_eq!(events.try_recv().unwrap(), SessionEvent::TokenRefreshed);
    }

    #[tokio::test]
    async fn test_restore_drops_session_when_refresh_rejected() {
        let (url, _) = serve(vec![
            route("GET /auth/v1/user", 401, r#"{"msg":"invalid JWT"}"#),
            route(
                "POST /auth/v1/token?grant_type=refresh_token",
                400,
                r#"{"error":"invalid_grant","error_description":"Refresh Token Not Found"}"#,
            ),
        ])
        .await;
        let storage = Arc::new(MemoryStorage::new());
        storage.set(PROVIDER_SESSION_KEY, &session_body("at")).unwrap();
        let auth = backend(&url, storage.clone());

        assert_eq!(auth.restore().await.unwrap(), None);
        assert_eq!(storage.get(PROVIDER_SESSION_KEY), None);
    }

    #[tokio::test]
    async fn test_restore_during_outage_keeps_session() {
        let (url, seen) = serve(vec![
            route("GET /auth/v1/user", 503, r#"{"message":"Service unavailable"}"#),
            route("POST /auth/v1/token?grant_type=refresh_token", 503, "{}"),
        ])
        .await;
        let storage = Arc::new(MemoryStorage::new());
        storage.set(PROVIDER_SESSION_KEY, &session_body("at")).unwrap();
        let model = AuthModel::new(backend(&url, storage.clone()), false);

        model.init().await;
        assert!(!model.is_authenticated());
        assert_eq!(model.error().as_deref(), Some("Service unavailable"));
        assert_eq!(stored_token(&storage).as_deref(), Some("at"));
        assert_eq!(seen_count(&seen, "POST /auth/v1/token?grant_type=refresh_token"), 0);
    }

    #[tokio::test]
    async fn test_sign_up_awaiting_confirmation_stays_signed_out() {
        let (url, _) = serve(vec![route(
            "POST /auth/v1/signup",
            200,
            json!({ "id": "91ce", "email": "new@radioanalysis.com", "user_metadata": {} }).to_string(),
        )])
        .await;
        let storage = Arc::new(MemoryStorage::new());
        let model = AuthModel::new(backend(&url, storage.clone()), false);

        assert!(!model.register("new@radioanalysis.com", "secret", "New Analyst").await);
        assert!(!model.is_authenticated());
        assert_eq!(model.error().as_deref(), Some(CONFIRM_EMAIL_MESSAGE));
        assert_eq!(storage.get(PROVIDER_SESSION_KEY), None);
    }

    #[tokio::test]
    async fn test_sign_up_with_session_signs_in() {
        let (url, _) = serve(vec![route("POST /auth/v1/signup", 200, session_body("at"))]).await;
        let storage = Arc::new(MemoryStorage::new());
        let model = AuthModel::new(backend(&url, storage.clone()), false);

        assert!(model.register("m.rousseau@radioanalysis.com", "secret", "Marie Rousseau").await);
        assert_eq!(model.current_user().unwrap().name, "Marie Rousseau");
        assert_eq!(stored_token(&storage).as_deref(), Some("at"));
    }
}
