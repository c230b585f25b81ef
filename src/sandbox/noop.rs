//! No-op provider for running with sandboxing disabled.

use async_trait::async_trait;

use super::error::Result;
use super::types::{
    CreateSandboxParams, PreviewLink, SandboxHandle, SandboxState, SessionCommand,
    SessionExecuteRequest,
};
use super::SandboxProvider;

/// A provider that never talks to anything.
///
/// Useful for:
/// - Running tools locally with `[sandbox] enabled = false`
/// - Tests that need a `SandboxProvider` but no network
#[derive(Debug, Default, Clone)]
pub struct NoopProvider;

impl NoopProvider {
    /// Creates a new `NoopProvider`.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SandboxProvider for NoopProvider {
    fn name(&self) -> &'static str {
        "Disabled"
    }

    async fn create(&self, _params: &CreateSandboxParams) -> Result<SandboxHandle> {
        // Empty id signals that nothing was provisioned
        Ok(SandboxHandle::new(String::new(), SandboxState::Active))
    }

    async fn get(&self, sandbox_id: &str) -> Result<SandboxHandle> {
        Ok(SandboxHandle::new(sandbox_id, SandboxState::Active))
    }

    async fn start(&self, _sandbox: &SandboxHandle) -> Result<()> {
        Ok(())
    }

    async fn create_session(&self, _sandbox: &SandboxHandle, _session_id: &str) -> Result<()> {
        Ok(())
    }

    async fn execute_session_command(
        &self,
        _sandbox: &SandboxHandle,
        _session_id: &str,
        _request: &SessionExecuteRequest,
    ) -> Result<SessionCommand> {
        Ok(SessionCommand::default())
    }

    async fn get_preview_link(&self, _sandbox: &SandboxHandle, _port: u16) -> Result<PreviewLink> {
        Ok(PreviewLink::default())
    }
}
