//! Domain-specific error types for sandbox operations.
//!
//! Typed errors enable callers to match on specific failure modes
//! rather than parsing error message strings.

/// Errors that can occur while provisioning or resolving sandboxes.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The sandbox provider could not be reached at all.
    #[error("Sandbox provider is not available: {message}")]
    ProviderUnavailable {
        /// Transport-level failure description.
        message: String,
    },

    /// The provider has no sandbox with this id.
    #[error("Sandbox not found: {sandbox_id}")]
    NotFound {
        /// The id that was looked up.
        sandbox_id: String,
    },

    /// The provider answered with a non-success status.
    #[error("Sandbox provider returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// A provider or store response could not be decoded.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Decoder failure description.
        message: String,
    },

    /// The project store has no record for this project.
    #[error("Project {project_id} not found")]
    ProjectNotFound {
        /// The project id that was looked up.
        project_id: String,
    },

    /// The project exists but carries no sandbox reference.
    #[error("No sandbox found for project {project_id}")]
    NoSandboxForProject {
        /// The project id whose record lacks a sandbox id.
        project_id: String,
    },

    /// A tool accessor was used before the sandbox was resolved.
    #[error("{what} not initialized. Call ensure_sandbox() first.")]
    NotInitialized {
        /// Which piece of cached state was requested.
        what: &'static str,
    },

    /// The project store request failed.
    #[error("Project store request failed: {message}")]
    Store {
        /// Store failure description.
        message: String,
    },

    /// Writing user-facing output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl SandboxError {
    /// Creates a `ProviderUnavailable` error.
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Creates a `NotFound` error.
    pub fn not_found(sandbox_id: impl Into<String>) -> Self {
        Self::NotFound {
            sandbox_id: sandbox_id.into(),
        }
    }

    /// Creates an `Api` error from a status code and body.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Creates a `Decode` error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a `ProjectNotFound` error.
    pub fn project_not_found(project_id: impl Into<String>) -> Self {
        Self::ProjectNotFound {
            project_id: project_id.into(),
        }
    }

    /// Creates a `NoSandboxForProject` error.
    pub fn no_sandbox_for_project(project_id: impl Into<String>) -> Self {
        Self::NoSandboxForProject {
            project_id: project_id.into(),
        }
    }

    /// Creates a `NotInitialized` error.
    pub fn not_initialized(what: &'static str) -> Self {
        Self::NotInitialized { what }
    }

    /// Creates a `Store` error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Returns true if the provider reported the sandbox as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the project lookup failed on a missing record or
    /// missing sandbox reference.
    pub fn is_missing_reference(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. } | Self::NoSandboxForProject { .. }
        )
    }

    /// Returns true if an accessor was used before resolution.
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }
}

/// Result alias for sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;
