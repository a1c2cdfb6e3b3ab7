//! Session / token manager.
//!
//! Tokens live in `StoragePort`; `AuthSession` is the explicit session object
//! every request goes through. A 401 triggers at most one refresh-and-retry:
//!
//! 1. send the request with the current access token
//! 2. on 401, exchange the refresh token for a new access token
//! 3. re-issue the request once with the new token and return whatever comes back
//!
//! Concurrent 401s are not coalesced; each request refreshes on its own.

use std::rc::Rc;

use serde_json::json;

use elearn_types::{
    config::ClientConfig,
    event::{ClientEvent, Route},
    session::{
        bearer, Credentials, LoginResponse, RefreshResponse, Session, UserRole,
        ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, ROLE_KEY, USER_ID_KEY,
    },
    AuthFailure, ClientError, Result,
};

use crate::event_bus::EventBus;
use crate::ports::{HttpPort, HttpRequest, HttpResponse, StoragePort, AUTHORIZATION};

pub const LOGIN_PATH: &str = "/api/login/";
pub const LOGOUT_PATH: &str = "/api/logout/";
pub const REFRESH_PATH: &str = "/api/token/refresh/";

// ─── TokenStore ──────────────────────────────────────────────

/// Typed view over the persisted session keys.
#[derive(Clone)]
pub struct TokenStore {
    storage: Rc<dyn StoragePort>,
}

impl TokenStore {
    pub fn new(storage: Rc<dyn StoragePort>) -> Self {
        Self { storage }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(v) => v.filter(|s| !s.is_empty()),
            Err(e) => {
                log::warn!("Failed to read {} from {}: {}", key, self.storage.backend_name(), e);
                None
            }
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn user_id(&self) -> Option<u64> {
        self.read(USER_ID_KEY).and_then(|s| s.parse().ok())
    }

    pub fn role(&self) -> Option<UserRole> {
        self.read(ROLE_KEY).and_then(|s| s.parse().ok())
    }

    /// The full session, if both tokens are present
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
            user_id: self.user_id(),
            role: self.role(),
        })
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        match session.user_id {
            Some(id) => self.storage.set(USER_ID_KEY, &id.to_string())?,
            None => self.storage.remove(USER_ID_KEY)?,
        }
        match session.role {
            Some(role) => self.storage.set(ROLE_KEY, role.as_str())?,
            None => self.storage.remove(ROLE_KEY)?,
        }
        Ok(())
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.storage.set(ACCESS_TOKEN_KEY, token)
    }

    /// Remove the access/refresh pair, leaving user id and role.
    pub fn clear_tokens(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(e) = self.storage.remove(key) {
                log::warn!("Failed to remove {}: {}", key, e);
            }
        }
    }

    /// Remove every session key.
    pub fn clear(&self) {
        self.clear_tokens();
        for key in [USER_ID_KEY, ROLE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                log::warn!("Failed to remove {}: {}", key, e);
            }
        }
    }
}

// ─── AuthSession ─────────────────────────────────────────────

pub struct AuthSession {
    config: ClientConfig,
    tokens: TokenStore,
    bus: EventBus,
}

impl AuthSession {
    pub fn new(config: ClientConfig, tokens: TokenStore, bus: EventBus) -> Self {
        Self { config, tokens, bus }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.access_token().is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.tokens.role()
    }

    pub fn user_id(&self) -> Option<u64> {
        self.tokens.user_id()
    }

    /// Default `Authorization` header for new requests
    pub fn authorization(&self) -> Option<String> {
        self.tokens.access_token().map(|t| bearer(&t))
    }

    /// Set `Authorization: Bearer <access>` when an access token is stored.
    pub fn attach_token(&self, req: &mut HttpRequest) {
        if let Some(value) = self.authorization() {
            req.set_header(AUTHORIZATION, value);
        }
    }

    /// Send `req` with the current token, refreshing and re-issuing it once on 401.
    ///
    /// A 401 on the re-issued request is returned as-is; it never triggers a
    /// second refresh.
    pub async fn execute(&self, http: &dyn HttpPort, mut req: HttpRequest) -> Result<HttpResponse> {
        self.attach_token(&mut req);
        let response = http.send(&req).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }
        log::warn!("401 from {}, attempting token refresh", req.url);
        self.on_unauthorized(http, req).await
    }

    /// Handle a 401 on `failed`: refresh the access token and re-issue the request.
    pub async fn on_unauthorized(
        &self,
        http: &dyn HttpPort,
        mut failed: HttpRequest,
    ) -> Result<HttpResponse> {
        let access = self.renew_access(http, &failed).await?;
        failed.set_header(AUTHORIZATION, bearer(&access));
        http.send(&failed).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Any failure is terminal for the request chain: both tokens are cleared
    /// and, when `failed` requires authentication, the user is sent to login.
    pub async fn renew_access(
        &self,
        http: &dyn HttpPort,
        failed: &HttpRequest,
    ) -> std::result::Result<String, AuthFailure> {
        let Some(refresh) = self.tokens.refresh_token() else {
            log::error!("No refresh token available");
            self.end_session(failed.requires_auth);
            return Err(AuthFailure::NoRefreshToken);
        };

        match self.refresh(http, &refresh).await {
            Ok(access) => {
                if let Err(e) = self.tokens.set_access_token(&access) {
                    log::warn!("Refreshed token could not be persisted: {}", e);
                }
                self.bus.emit(ClientEvent::SessionChanged { signed_in: true });
                Ok(access)
            }
            Err(failure) => {
                log::error!("Token refresh failed: {}", failure);
                self.end_session(failed.requires_auth);
                Err(failure)
            }
        }
    }

    async fn refresh(
        &self,
        http: &dyn HttpPort,
        refresh_token: &str,
    ) -> std::result::Result<String, AuthFailure> {
        let req = HttpRequest::post(self.config.api_url(REFRESH_PATH))
            .json(&json!({ "refresh": refresh_token }))
            .map_err(|e| AuthFailure::Transport(e.to_string()))?;

        let response = http
            .send(&req)
            .await
            .map_err(|e| AuthFailure::Transport(e.to_string()))?;

        if !response.ok() {
            return Err(AuthFailure::RefreshRejected {
                status: response.status,
            });
        }

        let data: RefreshResponse = response
            .json()
            .map_err(|e| AuthFailure::Transport(format!("invalid refresh response: {}", e)))?;
        Ok(data.access)
    }

    fn end_session(&self, redirect: bool) {
        self.tokens.clear_tokens();
        self.bus.emit(ClientEvent::SessionChanged { signed_in: false });
        if redirect {
            self.bus.emit(ClientEvent::navigate(Route::Login));
        }
    }

    // ─── Login / logout ──────────────────────────────────────

    pub async fn login(&self, http: &dyn HttpPort, username: &str, password: &str) -> Result<Session> {
        if username.trim().is_empty() || password.is_empty() {
            self.bus.emit(ClientEvent::error("Username and password are required."));
            return Err(ClientError::Validation("missing credentials".to_string()));
        }

        let credentials = Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        let req = HttpRequest::post(self.config.api_url(LOGIN_PATH)).json(&credentials)?;

        let result = async {
            let response = http.send(&req).await?.error_for_status()?;
            let data: LoginResponse = response.json()?;
            let session = Session::from(data);
            self.tokens.save(&session)?;
            Ok::<_, ClientError>(session)
        }
        .await;

        match result {
            Ok(session) => {
                log::info!("Signed in as user {:?}", session.user_id);
                self.bus.emit(ClientEvent::SessionChanged { signed_in: true });
                self.bus.emit(ClientEvent::success("Logged in successfully!"));
                self.bus.emit(ClientEvent::navigate(Route::Dashboard));
                Ok(session)
            }
            Err(e) => {
                log::warn!("Login failed: {}", e);
                self.bus.emit(ClientEvent::error(
                    "Login failed. Please check your credentials.",
                ));
                Err(e)
            }
        }
    }

    /// Revoke the refresh token server-side, then forget the session.
    /// On failure the session is kept.
    pub async fn logout(&self, http: &dyn HttpPort) -> Result<()> {
        let body = json!({ "refresh_token": self.tokens.refresh_token() });
        let req = HttpRequest::post(self.config.api_url(LOGOUT_PATH)).json(&body)?;

        match self.execute(http, req).await.and_then(|r| r.error_for_status()) {
            Ok(_) => {
                self.tokens.clear();
                self.bus.emit(ClientEvent::success("Logged out successfully!"));
                self.bus.emit(ClientEvent::SessionChanged { signed_in: false });
                self.bus.emit(ClientEvent::navigate(Route::Login));
                Ok(())
            }
            Err(e) => {
                log::error!("Logout error: {}", e);
                self.bus.emit(ClientEvent::error("Logout failed. Please try again."));
                Err(e)
            }
        }
    }

    /// Forget the session locally without contacting the server.
    pub fn sign_out_local(&self) {
        self.tokens.clear();
        self.bus.emit(ClientEvent::SessionChanged { signed_in: false });
        self.bus.emit(ClientEvent::navigate(Route::Login));
    }

    /// Route guard: where a request for `route` actually lands.
    pub fn resolve_route(&self, route: Route, allowed: Option<&[UserRole]>) -> Route {
        if route == Route::Login && self.is_authenticated() {
            return Route::Dashboard;
        }
        if !route.requires_auth() {
            return route;
        }
        if !self.is_authenticated() {
            return Route::Login;
        }
        match (allowed, self.role()) {
            (Some(roles), Some(role)) if roles.contains(&role) => route,
            (Some(_), _) => Route::Unauthorized,
            (None, _) => route,
        }
    }
}
