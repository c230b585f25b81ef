use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::sandbox::SandboxResources;

/// File name searched for in the working directory and the user config dir.
pub const CONFIG_FILE: &str = "sandboxer.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote sandbox provider connection.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Project record store connection.
    #[serde(default)]
    pub store: StoreConfig,
    /// Sandbox creation settings.
    #[serde(default)]
    pub sandbox: SandboxConfig,
}

/// Remote sandbox provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key, sent as a bearer token.
    /// Env: `DAYTONA_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider API base URL.
    /// Env: `DAYTONA_SERVER_URL`
    #[serde(default)]
    pub server_url: Option<String>,

    /// Region/target new sandboxes are placed in.
    /// Env: `DAYTONA_TARGET`
    #[serde(default)]
    pub target: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            server_url: None,
            target: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Project store (PostgREST) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the store, without the `/rest/v1` suffix.
    /// Env: `SUPABASE_URL`
    #[serde(default)]
    pub url: Option<String>,

    /// Service key, sent both as `apikey` and bearer token.
    /// Env: `SUPABASE_SERVICE_ROLE_KEY`
    #[serde(default)]
    pub key: Option<String>,

    /// Table holding project records
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            table: default_table(),
        }
    }
}

/// Settings applied to every sandbox this crate creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// When false, every provider call is a no-op
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Image new sandboxes boot from
    #[serde(default = "default_image")]
    pub image: String,

    /// Whether preview links are reachable without a token
    #[serde(default = "default_true")]
    pub public: bool,

    /// Resource request
    #[serde(default)]
    pub resources: SandboxResources,

    /// Working directory inside the sandbox
    #[serde(default = "default_workspace_path")]
    pub workspace_path: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image: default_image(),
            public: true,
            resources: SandboxResources::default(),
            workspace_path: default_workspace_path(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_table() -> String {
    "projects".to_string()
}

fn default_image() -> String {
    "adamcohenhillel/kortix-suna:0.0.20".to_string()
}

fn default_workspace_path() -> String {
    "/workspace".to_string()
}

impl Config {
    /// Load configuration, then apply environment overrides.
    ///
    /// An explicit `path` must exist. Without one, `sandboxer.toml` is looked
    /// up in `project_dir` and then in the user config directory; defaults
    /// are used when neither exists.
    pub fn load(project_dir: &Path, path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::locate(project_dir) {
                Some(found) => Self::from_file(&found)?,
                None => {
                    debug!("No {} found, using defaults", CONFIG_FILE);
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.warn_missing();
        Ok(config)
    }

    fn locate(project_dir: &Path) -> Option<PathBuf> {
        let local = project_dir.join(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }

        let user = dirs::config_dir()?.join("sandboxer").join(CONFIG_FILE);
        user.exists().then_some(user)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override file values with environment variables, when set and non-empty.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("DAYTONA_API_KEY") {
            self.provider.api_key = Some(v);
        }
        if let Some(v) = get("DAYTONA_SERVER_URL") {
            self.provider.server_url = Some(v);
        }
        if let Some(v) = get("DAYTONA_TARGET") {
            self.provider.target = Some(v);
        }
        if let Some(v) = get("SUPABASE_URL") {
            self.store.url = Some(v);
        }
        if let Some(v) = get("SUPABASE_SERVICE_ROLE_KEY") {
            self.store.key = Some(v);
        }
    }

    /// Log which provider settings are missing. Nothing fails here; the
    /// provider rejects requests later if it needs them.
    pub fn warn_missing(&self) {
        if !self.sandbox.enabled {
            debug!("Sandbox provider disabled; skipping provider checks");
            return;
        }

        if self.provider.api_key.is_some() {
            debug!("Sandbox provider API key configured");
        } else {
            warn!("No sandbox provider API key found (DAYTONA_API_KEY)");
        }

        match &self.provider.server_url {
            Some(url) => debug!("Sandbox provider URL set to: {}", url),
            None => warn!("No sandbox provider URL found (DAYTONA_SERVER_URL)"),
        }

        match &self.provider.target {
            Some(target) => debug!("Sandbox provider target set to: {}", target),
            None => warn!("No sandbox provider target found (DAYTONA_TARGET)"),
        }
    }
}
