//! Remote sandbox provisioning.
//!
//! The [`SandboxProvider`] trait is the seam to the external provisioning
//! service. [`DaytonaProvider`] talks to it over HTTP, [`NoopProvider`]
//! stands in when sandboxing is disabled. The functions in [`lifecycle`]
//! hold the get-or-start and creation logic on top of either.

mod daytona;
mod error;
pub mod lifecycle;
#[cfg(test)]
pub(crate) mod mock;
mod network;
mod noop;
mod types;

pub use daytona::DaytonaProvider;
pub use error::{Result, SandboxError};
pub use lifecycle::{create_sandbox, get_or_start_sandbox, start_supervisord_session};
pub use network::{exposed_ports, SandboxPort};
pub use noop::NoopProvider;
pub use types::{
    CreateSandboxParams, PreviewLink, SandboxHandle, SandboxResources, SandboxState,
    SessionCommand, SessionExecuteRequest,
};

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;

/// Operations the external sandbox service provides.
#[async_trait]
pub trait SandboxProvider: Send + Sync {
    /// Returns the provider name for display.
    fn name(&self) -> &'static str;

    /// Creates a sandbox and returns its handle.
    async fn create(&self, params: &CreateSandboxParams) -> Result<SandboxHandle>;

    /// Fetches the current handle for a sandbox id.
    async fn get(&self, sandbox_id: &str) -> Result<SandboxHandle>;

    /// Requests that a stopped or archived sandbox be started.
    async fn start(&self, sandbox: &SandboxHandle) -> Result<()>;

    /// Creates a named process session inside the sandbox.
    async fn create_session(&self, sandbox: &SandboxHandle, session_id: &str) -> Result<()>;

    /// Runs a command in an existing session.
    async fn execute_session_command(
        &self,
        sandbox: &SandboxHandle,
        session_id: &str,
        request: &SessionExecuteRequest,
    ) -> Result<SessionCommand>;

    /// Returns the preview URL for a port exposed by the sandbox.
    async fn get_preview_link(&self, sandbox: &SandboxHandle, port: u16) -> Result<PreviewLink>;
}

/// Builds the provider selected by `[sandbox] enabled`.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn SandboxProvider>> {
    if config.sandbox.enabled {
        Ok(Arc::new(DaytonaProvider::from_config(&config.provider)?))
    } else {
        Ok(Arc::new(NoopProvider::new()))
    }
}
