//! Mock sandbox provider for testing.
//!
//! Returns scripted states from `get` and records every call so tests can
//! assert on the exact sequence of provider operations.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::error::{Result, SandboxError};
use super::types::{
    CreateSandboxParams, PreviewLink, SandboxHandle, SandboxState, SessionCommand,
    SessionExecuteRequest,
};
use super::SandboxProvider;

/// A provider operation observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Create(CreateSandboxParams),
    Get(String),
    Start(String),
    CreateSession(String, String),
    Execute(String, String, SessionExecuteRequest),
    Preview(String, u16),
}

/// Operation the mock should fail on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailOn {
    Create,
    Get,
    Start,
    CreateSession,
    Execute,
    Preview,
}

#[derive(Debug, Clone)]
pub(crate) struct MockProvider {
    /// States returned by successive `get` calls. The last one repeats.
    states: Arc<Vec<SandboxState>>,
    get_count: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<Call>>>,
    fail_on: Option<FailOn>,
}

impl MockProvider {
    /// Create a mock whose `get` returns `states` in order.
    pub fn new(states: Vec<SandboxState>) -> Self {
        assert!(!states.is_empty(), "mock needs at least one state");
        Self {
            states: Arc::new(states),
            get_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
        }
    }

    /// Create a mock that always reports `state`.
    pub fn with_state(state: SandboxState) -> Self {
        Self::new(vec![state])
    }

    /// Make one operation fail with a server error.
    pub fn failing(mut self, op: FailOn) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call, op: FailOn) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(op) {
            return Err(SandboxError::api(500, format!("mock {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl SandboxProvider for MockProvider {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn create(&self, params: &CreateSandboxParams) -> Result<SandboxHandle> {
        self.record(Call::Create(params.clone()), FailOn::Create)?;
        Ok(SandboxHandle::new("sb-created", SandboxState::Active))
    }

    async fn get(&self, sandbox_id: &str) -> Result<SandboxHandle> {
        self.record(Call::Get(sandbox_id.to_string()), FailOn::Get)?;
        let n = self.get_count.fetch_add(1, Ordering::SeqCst);
        let state = self.states[n.min(self.states.len() - 1)];
        Ok(SandboxHandle::new(sandbox_id, state))
    }

    async fn start(&self, sandbox: &SandboxHandle) -> Result<()> {
        self.record(Call::Start(sandbox.id.clone()), FailOn::Start)
    }

    async fn create_session(&self, sandbox: &SandboxHandle, session_id: &str) -> Result<()> {
        self.record(
            Call::CreateSession(sandbox.id.clone(), session_id.to_string()),
            FailOn::CreateSession,
        )
    }

    async fn execute_session_command(
        &self,
        sandbox: &SandboxHandle,
        session_id: &str,
        request: &SessionExecuteRequest,
    ) -> Result<SessionCommand> {
        self.record(
            Call::Execute(sandbox.id.clone(), session_id.to_string(), request.clone()),
            FailOn::Execute,
        )?;
        Ok(SessionCommand {
            cmd_id: Some("cmd-1".to_string()),
            ..Default::default()
        })
    }

    async fn get_preview_link(&self, sandbox: &SandboxHandle, port: u16) -> Result<PreviewLink> {
        self.record(Call::Preview(sandbox.id.clone(), port), FailOn::Preview)?;
        Ok(PreviewLink {
            url: format!("https://{port}-{}.preview.test", sandbox.id),
            token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_cycles_to_last_state() {
        let mock = MockProvider::new(vec![SandboxState::Stopped, SandboxState::Active]);
        assert_eq!(mock.get("a").await.unwrap().state, SandboxState::Stopped);
        assert_eq!(mock.get("a").await.unwrap().state, SandboxState::Active);
        assert_eq!(mock.get("a").await.unwrap().state, SandboxState::Active);
        assert_eq!(mock.count(|c| matches!(c, Call::Get(_))), 3);
    }

    #[tokio::test]
    async fn test_mock_failure_still_records() {
        let mock = MockProvider::with_state(SandboxState::Active).failing(FailOn::Get);
        assert!(mock.get("a").await.is_err());
        assert_eq!(mock.calls(), vec![Call::Get("a".to_string())]);
    }
}
