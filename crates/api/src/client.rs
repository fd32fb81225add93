//! The gateway client: one base address, bearer attachment, and the
//! cross-cutting 401 policy.

use {
    reqwest::{Method, StatusCode, multipart},
    tracing::{debug, warn},
};

use cpss_session::SessionHandle;

use crate::{
    error::{ApiError, detail_from_body},
    types::{
        BotConfigRequest, BotConfigResponse, BotStatus, LoginRequest, Platform, Preset,
        PresetRequest, Publication, PublicationStatus, PublishRequest, ToggleResult, Token,
        UploadedMedia,
    },
};

/// Client for the CPSS backend API.
///
/// Holds a clone of the [`SessionHandle`], so the bearer header is read at
/// send time: login and logout propagate to the next request with no
/// stale-header window. All screens share this one client; none of them
/// handle 401 themselves.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionHandle) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        let mut req = self.http.request(method, url);
        if let Some(token) = self.session.bearer() {
            req = req.bearer_auth(token);
        }
        req
    }

    /// Single choke point for response handling.
    ///
    /// A 401 from any endpoint tears the session down — memory and durable
    /// storage — before the error is returned, so every subsequent request
    /// from any command sees the logged-out state. Other failures carry the
    /// backend's `detail` when present and are left to the caller.
    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend rejected credential, clearing session");
            if let Err(e) = self.session.clear() {
                warn!(error = %e, "failed to clear persisted session");
            }
            return Err(ApiError::Unauthorized);
        }
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        let detail = detail_from_body(&body)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Err(ApiError::Api { status, detail })
    }

    // ── Auth ─────────────────────────────────────────────────────────────

    /// POST `/auth/login`. On success the session is established on the
    /// shared handle (memory and disk, atomically); on failure the prior
    /// state is left untouched.
    ///
    /// Login is the one call exempt from the 401 teardown: a wrong password
    /// is a normal `Api` error with the backend's detail ("Incorrect
    /// username or password"), not a session event.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        // Deliberately not routed through `request`/`check`: no bearer is
        // attached, and a 401 here must not clear an existing session.
        let resp = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = detail_from_body(&body).unwrap_or_else(|| "Login failed".to_string());
            return Err(ApiError::Api { status, detail });
        }

        let token: Token = resp.json().await?;
        self.session
            .establish(token.access_token, username.to_string())
            .map_err(|e| ApiError::Session(e.to_string()))?;
        debug!(username, "session established");
        Ok(())
    }

    // ── Bots ─────────────────────────────────────────────────────────────

    /// GET `/bots/configure/{platform}`. A 404 means "no configuration
    /// yet" and is not an error.
    pub async fn bot_config(
        &self,
        platform: Platform,
    ) -> Result<Option<BotConfigResponse>, ApiError> {
        let resp = self
            .request(Method::GET, &format!("/bots/configure/{platform}"))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = self.check(resp).await?;
        Ok(Some(resp.json().await?))
    }

    /// POST `/bots/configure` — wholesale upsert of one platform's
    /// credentials.
    pub async fn configure_bot(
        &self,
        config: &BotConfigRequest,
    ) -> Result<BotConfigResponse, ApiError> {
        let resp = self
            .request(Method::POST, "/bots/configure")
            .json(config)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    /// POST `/bots/configure/{platform}/toggle`.
    pub async fn toggle_bot(&self, platform: Platform) -> Result<ToggleResult, ApiError> {
        let resp = self
            .request(Method::POST, &format!("/bots/configure/{platform}/toggle"))
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    /// GET `/bots/status`.
    pub async fn bots_status(&self) -> Result<Vec<BotStatus>, ApiError> {
        let resp = self.request(Method::GET, "/bots/status").send().await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    // ── Presets ──────────────────────────────────────────────────────────

    pub async fn presets(&self) -> Result<Vec<Preset>, ApiError> {
        let resp = self.request(Method::GET, "/presets").send().await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn create_preset(&self, preset: &PresetRequest) -> Result<Preset, ApiError> {
        let resp = self
            .request(Method::POST, "/presets")
            .json(preset)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn update_preset(&self, id: i64, preset: &PresetRequest) -> Result<Preset, ApiError> {
        let resp = self
            .request(Method::PUT, &format!("/presets/{id}"))
            .json(preset)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete_preset(&self, id: i64) -> Result<(), ApiError> {
        let resp = self
            .request(Method::DELETE, &format!("/presets/{id}"))
            .send()
            .await?;
        self.check(resp).await?;
        Ok(())
    }

    // ── Publishing ───────────────────────────────────────────────────────

    /// POST `/publish/upload` — one independent multipart request per file.
    pub async fn upload_media(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        mime_type: Option<&str>,
    ) -> Result<UploadedMedia, ApiError> {
        let mut part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        if let Some(mime) = mime_type {
            part = part.mime_str(mime)?;
        }
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .request(Method::POST, "/publish/upload")
            .multipart(form)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    /// POST `/publish`.
    pub async fn publish(&self, request: &PublishRequest) -> Result<Publication, ApiError> {
        let resp = self
            .request(Method::POST, "/publish")
            .json(request)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    // ── Queue ────────────────────────────────────────────────────────────

    /// GET `/queue`, newest first.
    pub async fn queue(
        &self,
        status_filter: Option<PublicationStatus>,
        limit: Option<u32>,
    ) -> Result<Vec<Publication>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(status) = status_filter {
            query.push(("status_filter", status.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        let resp = self
            .request(Method::GET, "/queue")
            .query(&query)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    /// GET `/queue/{id}`.
    pub async fn publication(&self, id: i64) -> Result<Publication, ApiError> {
        let resp = self
            .request(Method::GET, &format!("/queue/{id}"))
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json().await?)
    }

    /// DELETE `/queue/{id}`.
    pub async fn delete_publication(&self, id: i64) -> Result<(), ApiError> {
        let resp = self
            .request(Method::DELETE, &format!("/queue/{id}"))
            .send()
            .await?;
        self.check(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        cpss_session::{SessionHandle, store::SessionStore},
        serde_json::json,
    };

    use super::*;

    fn handle(dir: &tempfile::TempDir) -> SessionHandle {
        SessionHandle::new(SessionStore::with_path(dir.path().join("session.json")))
    }

    fn logged_in(dir: &tempfile::TempDir) -> SessionHandle {
        let h = handle(dir);
        h.establish("test-token".into(), "admin".into()).unwrap();
        h
    }

    #[tokio::test]
    async fn login_establishes_session_and_later_requests_carry_bearer() {
        let mut server = mockito::Server::new_async().await;
        let login_mock = server
            .mock("POST", "/auth/login")
            .match_body(mockito::Matcher::Json(json!({
                "username": "admin",
                "password": "hunter2"
            })))
            .with_status(200)
            .with_body(r#"{"access_token": "jwt-abc", "token_type": "bearer"}"#)
            .create_async()
            .await;
        let status_mock = server
            .mock("GET", "/bots/status")
            .match_header("authorization", "Bearer jwt-abc")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = handle(&dir);
        let client = ApiClient::new(server.url(), session.clone());

        client.login("admin", "hunter2").await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.principal().unwrap().username, "admin");

        let statuses = client.bots_status().await.unwrap();
        assert!(statuses.is_empty());

        login_mock.assert_async().await;
        status_mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_login_surfaces_detail_and_leaves_session_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"detail": "Invalid credentials"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = handle(&dir);
        let client = ApiClient::new(server.url(), session.clone());

        let err = client.login("admin", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn failed_login_does_not_tear_down_an_existing_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(401)
            .with_body(r#"{"detail": "Incorrect username or password"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = logged_in(&dir);
        let client = ApiClient::new(server.url(), session.clone());

        let err = client.login("admin", "typo").await.unwrap_err();
        assert!(matches!(err, ApiError::Api { .. }));
        // Prior session untouched.
        assert!(session.is_authenticated());
        assert_eq!(session.bearer().as_deref(), Some("test-token"));
    }

    #[tokio::test]
    async fn any_401_clears_memory_and_durable_session() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/presets")
            .with_status(401)
            .with_body(r#"{"detail": "Could not validate credentials"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let session = logged_in(&dir);
        let client = ApiClient::new(server.url(), session.clone());

        let err = client.presets().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!session.is_authenticated());
        // Durable state is gone too: a restart cannot resurrect the session.
        let fresh = handle(&dir);
        assert!(!fresh.restore());
    }

    #[tokio::test]
    async fn requests_after_teardown_carry_no_bearer() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bots/status")
            .with_status(401)
            .create_async()
            .await;
        let unauthed = server
            .mock("GET", "/presets")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        assert!(client.bots_status().await.is_err());
        client.presets().await.unwrap();
        unauthed.assert_async().await;
    }

    #[tokio::test]
    async fn bot_config_404_is_none_not_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bots/configure/discord")
            .with_status(404)
            .with_body(r#"{"detail": "Bot configuration for discord not found"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        let config = client.bot_config(Platform::Discord).await.unwrap();
        assert!(config.is_none());
    }

    #[tokio::test]
    async fn bot_config_other_failures_are_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/bots/configure/telegram")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        let err = client.bot_config(Platform::Telegram).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn configure_bot_posts_full_replacement() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bots/configure")
            .match_body(mockito::Matcher::Json(json!({
                "platform": "telegram",
                "token": "123:abc",
                "config": {"channel_id": "-1001234567890"}
            })))
            .with_status(200)
            .with_body(
                r#"{"id": 1, "platform": "telegram", "is_active": false,
                    "config": {"channel_id": "-1001234567890"},
                    "last_health_check": null}"#,
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        let mut config = serde_json::Map::new();
        config.insert("channel_id".into(), json!("-1001234567890"));
        let saved = client
            .configure_bot(&BotConfigRequest {
                platform: Platform::Telegram,
                token: "123:abc".into(),
                config,
            })
            .await
            .unwrap();
        assert_eq!(saved.platform, Platform::Telegram);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn preset_crud_hits_expected_routes() {
        let mut server = mockito::Server::new_async().await;
        let preset_body = r#"{"id": 5, "name": "clips", "platform": "twitch",
            "config": {}, "is_active": true,
            "created_at": "2025-11-03T10:00:00"}"#;
        let create = server
            .mock("POST", "/presets")
            .with_status(200)
            .with_body(preset_body)
            .create_async()
            .await;
        let update = server
            .mock("PUT", "/presets/5")
            .with_status(200)
            .with_body(preset_body)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/presets/5")
            .with_status(200)
            .with_body(r#"{"message": "Preset deleted successfully"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        let req = PresetRequest {
            name: "clips".into(),
            platform: Platform::Twitch,
            config: serde_json::Map::new(),
        };
        let created = client.create_preset(&req).await.unwrap();
        assert_eq!(created.id, 5);
        client.update_preset(5, &req).await.unwrap();
        client.delete_preset(5).await.unwrap();

        create.assert_async().await;
        update.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn upload_parses_media_handle() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/publish/upload")
            .match_header(
                "content-type",
                mockito::Matcher::Regex("multipart/form-data.*".into()),
            )
            .with_status(200)
            .with_body(
                r#"{"id": 17, "filename": "a1b2.mp4", "original_filename": "clip.mp4",
                    "file_size": 1024, "mime_type": "video/mp4"}"#,
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        let media = client
            .upload_media("clip.mp4", b"fake video".to_vec(), Some("video/mp4"))
            .await
            .unwrap();
        assert_eq!(media.id, 17);
        assert_eq!(media.original_filename.as_deref(), Some("clip.mp4"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn publish_sends_referenced_media_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/publish")
            .match_body(mockito::Matcher::Json(json!({
                "preset_id": 3,
                "media_id": 17,
                "title": "Weekly recap"
            })))
            .with_status(200)
            .with_body(
                r#"{"id": 9, "preset_id": 3, "media_id": 17, "title": "Weekly recap",
                    "description": null, "scheduled_at": null, "status": "queued",
                    "result": {}, "created_at": "2025-11-03T10:00:00",
                    "published_at": null}"#,
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        let publication = client
            .publish(&PublishRequest {
                preset_id: 3,
                media_id: Some(17),
                title: Some("Weekly recap".into()),
                description: None,
                scheduled_at: None,
            })
            .await
            .unwrap();
        assert_eq!(publication.status, PublicationStatus::Queued);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn queue_passes_filters_as_query_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/queue")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("status_filter".into(), "failed".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(server.url(), logged_in(&dir));

        let items = client
            .queue(Some(PublicationStatus::Failed), Some(10))
            .await
            .unwrap();
        assert!(items.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        // Port from a server that has been shut down.
        let server = mockito::Server::new_async().await;
        let url = server.url();
        drop(server);

        let dir = tempfile::tempdir().unwrap();
        let client = ApiClient::new(url, logged_in(&dir));
        let err = client.bots_status().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
