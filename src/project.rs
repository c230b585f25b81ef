//! Project records and the store they are read from.
//!
//! Projects live in a PostgREST-style table; each row embeds a `sandbox`
//! descriptor with the provider id and VNC password of the project's sandbox.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::config::StoreConfig;
use crate::sandbox::{Result, SandboxError};

/// Sandbox descriptor embedded in a project record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxRef {
    /// Provider sandbox id.
    #[serde(default)]
    pub id: Option<String>,
    /// VNC password the sandbox was created with.
    #[serde(default)]
    pub pass: Option<String>,
}

/// A project row. Columns this crate does not use are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Primary key.
    pub project_id: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Embedded sandbox descriptor; may be null.
    #[serde(default)]
    pub sandbox: Option<SandboxRef>,
}

impl Project {
    /// The sandbox id, if the record carries a non-empty one.
    pub fn sandbox_id(&self) -> Option<&str> {
        self.sandbox
            .as_ref()
            .and_then(|s| s.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// The sandbox password, if recorded.
    pub fn sandbox_pass(&self) -> Option<&str> {
        self.sandbox.as_ref().and_then(|s| s.pass.as_deref())
    }
}

/// Read access to project records.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Looks up a project by id. `Ok(None)` means no such project.
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>>;
}

/// Project store reached over a PostgREST (Supabase) HTTP API.
pub struct RestProjectStore {
    client: Client,
    url: String,
    key: Option<String>,
    table: String,
}

impl RestProjectStore {
    /// Creates a store for the API rooted at `url` (without `/rest/v1`).
    pub fn new(
        url: impl Into<String>,
        key: Option<String>,
        table: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SandboxError::store(format!("http client: {e}")))?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            key,
            table: table.into(),
        })
    }

    /// Creates a store from the `[store]` config section.
    pub fn from_config(config: &StoreConfig, timeout: Duration) -> Result<Self> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| SandboxError::store("no project store URL configured (SUPABASE_URL)"))?;
        Self::new(url, config.key.clone(), config.table.clone(), timeout)
    }
}

#[async_trait]
impl ProjectStore for RestProjectStore {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        let url = format!("{}/rest/v1/{}", self.url, self.table);
        debug!("Fetching project {} from {}", project_id, url);

        let mut req = self
            .client
            .get(&url)
            .query(&[("select", "*".to_string()), ("project_id", format!("eq.{project_id}"))]);
        if let Some(key) = &self.key {
            req = req.header("apikey", key).bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SandboxError::store(format!("get project: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SandboxError::store(format!("get project {status}: {body}")));
        }

        let rows: Vec<Project> = resp
            .json()
            .await
            .map_err(|e| SandboxError::decode(format!("get project: {e}")))?;

        Ok(rows.into_iter().next())
    }
}

/// Project store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectStore {
    projects: HashMap<String, Project>,
}

impl InMemoryProjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a project record.
    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.project_id.clone(), project);
        self
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        Ok(self.projects.get(project_id).cloned())
    }
}
