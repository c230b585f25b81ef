//! Wire types shared by sandbox providers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxState {
    /// Running and reachable.
    #[serde(alias = "started")]
    Active,
    /// Stopped; needs a start request before use.
    Stopped,
    /// Archived to cold storage; needs a start request before use.
    Archived,
    /// Any state this crate does not act on (creating, starting, error...).
    #[default]
    #[serde(other)]
    Unknown,
}

impl SandboxState {
    /// True for states that must be started before the sandbox is usable.
    pub fn needs_start(self) -> bool {
        matches!(self, Self::Stopped | Self::Archived)
    }
}

impl std::fmt::Display for SandboxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Stopped => write!(f, "stopped"),
            Self::Archived => write!(f, "archived"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

fn state_or_unknown<'de, D>(deserializer: D) -> Result<SandboxState, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<SandboxState>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Opaque reference to a remote sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxHandle {
    /// Provider-assigned sandbox id.
    pub id: String,
    /// Lifecycle state at the time the handle was fetched.
    #[serde(default, deserialize_with = "state_or_unknown")]
    pub state: SandboxState,
    /// Labels attached at creation.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Provider region/target.
    #[serde(default)]
    pub target: Option<String>,
    /// Creation time, when reported.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SandboxHandle {
    /// Creates a handle with the given id and state and no metadata.
    pub fn new(id: impl Into<String>, state: SandboxState) -> Self {
        Self {
            id: id.into(),
            state,
            labels: BTreeMap::new(),
            target: None,
            created_at: None,
        }
    }
}

/// CPU, memory (GiB) and disk (GiB) requested for a sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxResources {
    /// vCPU count.
    pub cpu: u32,
    /// Memory in GiB.
    pub memory: u32,
    /// Disk in GiB.
    pub disk: u32,
}

impl Default for SandboxResources {
    fn default() -> Self {
        Self {
            cpu: 2,
            memory: 4,
            disk: 5,
        }
    }
}

/// Request body for creating a sandbox.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSandboxParams {
    /// Container image.
    pub image: String,
    /// Whether preview links are reachable without a token.
    pub public: bool,
    /// Labels, omitted entirely when there are none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
    /// Environment variables.
    pub env: BTreeMap<String, String>,
    /// Ports to expose.
    pub ports: Vec<u16>,
    /// Resource request.
    #[serde(flatten)]
    pub resources: SandboxResources,
    /// Provider region/target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Command to run inside a named session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionExecuteRequest {
    /// Shell command line.
    pub command: String,
    /// Return immediately instead of waiting for the command to finish.
    #[serde(rename = "async")]
    pub run_async: bool,
}

/// Provider acknowledgement of a session command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCommand {
    /// Command id, for later log retrieval.
    #[serde(default)]
    pub cmd_id: Option<String>,
    /// Exit code, only present for synchronous commands.
    #[serde(default)]
    pub exit_code: Option<i32>,
    /// Captured output, only present for synchronous commands.
    #[serde(default)]
    pub output: Option<String>,
}

/// Public URL proxying a sandbox port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PreviewLink {
    /// Browser-reachable URL.
    pub url: String,
    /// Access token for non-public sandboxes.
    #[serde(default)]
    pub token: Option<String>,
}
