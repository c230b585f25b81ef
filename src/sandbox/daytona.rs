//! HTTP client for the Daytona sandbox API.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use super::error::{Result, SandboxError};
use super::types::{
    CreateSandboxParams, PreviewLink, SandboxHandle, SessionCommand, SessionExecuteRequest,
};
use super::SandboxProvider;
use crate::config::ProviderConfig;

/// Used when no server URL is configured.
const DEFAULT_SERVER_URL: &str = "https://app.daytona.io/api";

/// Sandbox provider backed by the Daytona REST API.
///
/// Holds one connection pool for all requests. Every request carries the
/// API key as a bearer token when one is configured. Ids are always sent as
/// single percent-encoded path segments.
pub struct DaytonaProvider {
    client: Client,
    server_url: Url,
    api_key: Option<String>,
}

impl DaytonaProvider {
    /// Creates a client for `server_url` with the given per-request timeout.
    pub fn new(
        server_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SandboxError::provider_unavailable(format!("http client: {e}")))?;

        let server_url = server_url.into();
        let server_url = Url::parse(&server_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                SandboxError::provider_unavailable(format!("invalid server URL: {server_url}"))
            })?;

        info!(
            server_url = %server_url,
            authenticated = api_key.is_some(),
            "sandbox provider client initialized"
        );

        Ok(Self {
            client,
            server_url,
            api_key,
        })
    }

    /// Creates a client from the `[provider]` config section.
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        Self::new(
            config
                .server_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Appends `segments` to the server URL, encoding each one so `/`, `?`
    /// and `#` inside an id cannot change the endpoint.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.server_url.clone();
        // Checked in `new`: the server URL can be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let req = self.client.request(method, self.url(segments));
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// Sends a request and turns transport failures and non-2xx statuses
    /// into typed errors.
    async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| SandboxError::provider_unavailable(format!("{what}: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        debug!("{} failed with {}: {}", what, status, body);
        Err(SandboxError::api(status.as_u16(), body))
    }

    async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
        resp.json()
            .await
            .map_err(|e| SandboxError::decode(format!("{what}: {e}")))
    }
}

#[async_trait]
impl SandboxProvider for DaytonaProvider {
    fn name(&self) -> &'static str {
        "Daytona"
    }

    async fn create(&self, params: &CreateSandboxParams) -> Result<SandboxHandle> {
        let resp = self
            .send(self.request(Method::POST, &["sandbox"]).json(params), "create")
            .await?;
        Self::decode(resp, "create").await
    }

    async fn get(&self, sandbox_id: &str) -> Result<SandboxHandle> {
        let req = self.request(Method::GET, &["sandbox", sandbox_id]);
        match self.send(req, "get").await {
            Ok(resp) => Self::decode(resp, "get").await,
            Err(SandboxError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(SandboxError::not_found(sandbox_id))
            }
            Err(e) => Err(e),
        }
    }

    async fn start(&self, sandbox: &SandboxHandle) -> Result<()> {
        let req = self.request(Method::POST, &["sandbox", &sandbox.id, "start"]);
        self.send(req, "start").await?;
        Ok(())
    }

    async fn create_session(&self, sandbox: &SandboxHandle, session_id: &str) -> Result<()> {
        let req = self.request(
            Method::POST,
            &["toolbox", &sandbox.id, "toolbox", "process", "session"],
        );
        let body = serde_json::json!({ "sessionId": session_id });
        self.send(req.json(&body), "create session").await?;
        Ok(())
    }

    async fn execute_session_command(
        &self,
        sandbox: &SandboxHandle,
        session_id: &str,
        request: &SessionExecuteRequest,
    ) -> Result<SessionCommand> {
        let req = self.request(
            Method::POST,
            &[
                "toolbox",
                &sandbox.id,
                "toolbox",
                "process",
                "session",
                session_id,
                "exec",
            ],
        );
        let resp = self.send(req.json(request), "session exec").await?;

        // Async commands may be acknowledged with an empty body.
        let text = resp
            .text()
            .await
            .map_err(|e| SandboxError::decode(format!("session exec: {e}")))?;
        if text.trim().is_empty() {
            return Ok(SessionCommand::default());
        }
        serde_json::from_str(&text)
            .map_err(|e| SandboxError::decode(format!("session exec: {e}")))
    }

    async fn get_preview_link(&self, sandbox: &SandboxHandle, port: u16) -> Result<PreviewLink> {
        let port = port.to_string();
        let req = self.request(
            Method::GET,
            &["sandbox", &sandbox.id, "ports", &port, "preview-url"],
        );
        let resp = self.send(req, "preview link").await?;
        Self::decode(resp, "preview link").await
    }
}
