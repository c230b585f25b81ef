//! Get-or-start resolution and creation of sandboxes.
//!
//! Every failure is logged here and returned unchanged. There is no retry:
//! callers decide what a failed provision means for them.

use std::collections::BTreeMap;
use tracing::{debug, error, info};

use super::error::{Result, SandboxError};
use super::network::exposed_ports;
use super::types::{CreateSandboxParams, SandboxHandle, SessionExecuteRequest};
use super::SandboxProvider;
use crate::config::Config;

/// Session that hosts the in-sandbox process supervisor.
pub const SUPERVISORD_SESSION: &str = "supervisord-session";

/// Runs supervisord in the foreground so the session owns it.
pub const SUPERVISORD_COMMAND: &str =
    "exec /usr/bin/supervisord -n -c /etc/supervisor/conf.d/supervisord.conf";

/// Fetch a sandbox, starting it first if it is stopped or archived.
///
/// Active and unknown states are returned untouched. A started sandbox is
/// re-fetched so the returned handle reflects its new state, and gets a
/// fresh supervisord session.
pub async fn get_or_start_sandbox(
    provider: &dyn SandboxProvider,
    sandbox_id: &str,
) -> Result<SandboxHandle> {
    info!("Getting or starting sandbox with ID: {}", sandbox_id);

    match resolve(provider, sandbox_id).await {
        Ok(sandbox) => {
            info!("Sandbox {} is ready", sandbox_id);
            Ok(sandbox)
        }
        Err(e) => {
            error!("Error retrieving or starting sandbox: {}", e);
            Err(e)
        }
    }
}

async fn resolve(provider: &dyn SandboxProvider, sandbox_id: &str) -> Result<SandboxHandle> {
    let sandbox = provider.get(sandbox_id).await?;
    if !sandbox.state.needs_start() {
        return Ok(sandbox);
    }

    info!("Sandbox is in {} state. Starting...", sandbox.state);
    restart(provider, &sandbox)
        .await
        .inspect_err(|e| error!("Error starting sandbox: {}", e))
}

async fn restart(provider: &dyn SandboxProvider, sandbox: &SandboxHandle) -> Result<SandboxHandle> {
    provider.start(sandbox).await?;
    let sandbox = provider.get(&sandbox.id).await?;
    start_supervisord_session(provider, &sandbox).await?;
    Ok(sandbox)
}

/// Create the supervisord session and launch supervisord in it without
/// waiting for it to exit.
pub async fn start_supervisord_session(
    provider: &dyn SandboxProvider,
    sandbox: &SandboxHandle,
) -> Result<()> {
    let session_id = SUPERVISORD_SESSION;

    let launch = async {
        info!("Creating session {} for supervisord", session_id);
        provider.create_session(sandbox, session_id).await?;
        provider
            .execute_session_command(
                sandbox,
                session_id,
                &SessionExecuteRequest {
                    command: SUPERVISORD_COMMAND.to_string(),
                    run_async: true,
                },
            )
            .await?;
        info!("Supervisord started in session {}", session_id);
        Ok::<_, SandboxError>(())
    };

    launch
        .await
        .inspect_err(|e| error!("Error starting supervisord session: {}", e))
}

/// Build the fixed creation request for a new sandbox.
///
/// `label_id` becomes the `id` label; no labels are sent when it is absent
/// or empty.
pub fn sandbox_params(
    config: &Config,
    password: &str,
    label_id: Option<&str>,
) -> CreateSandboxParams {
    let labels = label_id
        .filter(|id| !id.is_empty())
        .map(|id| BTreeMap::from([("id".to_string(), id.to_string())]));

    let env = [
        ("CHROME_PERSISTENT_SESSION", "true"),
        ("RESOLUTION", "1024x768x24"),
        ("RESOLUTION_WIDTH", "1024"),
        ("RESOLUTION_HEIGHT", "768"),
        ("VNC_PASSWORD", password),
        ("ANONYMIZED_TELEMETRY", "false"),
        ("CHROME_PATH", ""),
        ("CHROME_USER_DATA", ""),
        ("CHROME_DEBUGGING_PORT", "9222"),
        ("CHROME_DEBUGGING_HOST", "localhost"),
        ("CHROME_CDP", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    CreateSandboxParams {
        image: config.sandbox.image.clone(),
        public: config.sandbox.public,
        labels,
        env,
        ports: exposed_ports(),
        resources: config.sandbox.resources,
        target: config.provider.target.clone(),
    }
}

/// Create a sandbox with the fixed browser/VNC environment and start its
/// supervisord session.
pub async fn create_sandbox(
    provider: &dyn SandboxProvider,
    config: &Config,
    password: &str,
    label_id: Option<&str>,
) -> Result<SandboxHandle> {
    debug!("Creating new sandbox environment");
    debug!("Configuring sandbox with image {}", config.sandbox.image);

    let params = sandbox_params(config, password, label_id);
    let sandbox = provider.create(&params).await?;
    debug!("Sandbox created with ID: {}", sandbox.id);

    start_supervisord_session(provider, &sandbox).await?;
    debug!("Sandbox environment successfully initialized");
    Ok(sandbox)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::mock::{Call, FailOn, MockProvider};
    use crate::sandbox::{SandboxResources, SandboxState};

    fn supervisord_calls(id: &str) -> Vec<Call> {
        vec![
            Call::CreateSession(id.to_string(), SUPERVISORD_SESSION.to_string()),
            Call::Execute(
                id.to_string(),
                SUPERVISORD_SESSION.to_string(),
                SessionExecuteRequest {
                    command: SUPERVISORD_COMMAND.to_string(),
                    run_async: true,
                },
            ),
        ]
    }

    #[tokio::test]
    async fn test_active_sandbox_is_returned_without_start() {
        let mock = MockProvider::with_state(SandboxState::Active);
        let handle = get_or_start_sandbox(&mock, "sb-1").await.unwrap();

        assert_eq!(handle.id, "sb-1");
        assert_eq!(handle.state, SandboxState::Active);
        assert_eq!(mock.calls(), vec![Call::Get("sb-1".to_string())]);
    }

    #[tokio::test]
    async fn test_unknown_state_is_returned_without_start() {
        let mock = MockProvider::with_state(SandboxState::Unknown);
        let handle = get_or_start_sandbox(&mock, "sb-1").await.unwrap();

        assert_eq!(handle.state, SandboxState::Unknown);
        assert_eq!(mock.count(|c| matches!(c, Call::Start(_))), 0);
    }

    #[tokio::test]
    async fn test_stopped_sandbox_is_started_refetched_and_supervised() {
        let mock = MockProvider::new(vec![SandboxState::Stopped, SandboxState::Active]);
        let handle = get_or_start_sandbox(&mock, "sb-1").await.unwrap();

        assert_eq!(handle.state, SandboxState::Active);
        let mut expected = vec![
            Call::Get("sb-1".to_string()),
            Call::Start("sb-1".to_string()),
            Call::Get("sb-1".to_string()),
        ];
        expected.extend(supervisord_calls("sb-1"));
        assert_eq!(mock.calls(), expected);
    }

    #[tokio::test]
    async fn test_archived_sandbox_is_started() {
        let mock = MockProvider::new(vec![SandboxState::Archived, SandboxState::Active]);
        get_or_start_sandbox(&mock, "sb-2").await.unwrap();

        assert_eq!(mock.count(|c| matches!(c, Call::Start(_))), 1);
        assert_eq!(mock.count(|c| matches!(c, Call::CreateSession(..))), 1);
    }

    #[tokio::test]
    async fn test_get_failure_propagates() {
        let mock = MockProvider::with_state(SandboxState::Active).failing(FailOn::Get);
        let err = get_or_start_sandbox(&mock, "sb-1").await.unwrap_err();
        assert!(err.to_string().contains("mock Get failure"));
    }

    #[tokio::test]
    async fn test_start_failure_propagates_without_session() {
        let mock = MockProvider::with_state(SandboxState::Stopped).failing(FailOn::Start);
        let err = get_or_start_sandbox(&mock, "sb-1").await.unwrap_err();

        assert!(err.to_string().contains("mock Start failure"));
        assert_eq!(mock.count(|c| matches!(c, Call::CreateSession(..))), 0);
    }

    #[tokio::test]
    async fn test_supervisord_session_sequence() {
        let mock = MockProvider::with_state(SandboxState::Active);
        let handle = SandboxHandle::new("sb-3", SandboxState::Active);
        start_supervisord_session(&mock, &handle).await.unwrap();

        assert_eq!(mock.calls(), supervisord_calls("sb-3"));
    }

    #[tokio::test]
    async fn test_supervisord_session_failure_skips_command() {
        let mock = MockProvider::with_state(SandboxState::Active).failing(FailOn::CreateSession);
        let handle = SandboxHandle::new("sb-3", SandboxState::Active);
        assert!(start_supervisord_session(&mock, &handle).await.is_err());
        assert_eq!(mock.count(|c| matches!(c, Call::Execute(..))), 0);
    }

    #[tokio::test]
    async fn test_supervisord_command_failure_propagates() {
        let mock = MockProvider::with_state(SandboxState::Active).failing(FailOn::Execute);
        let handle = SandboxHandle::new("sb-3", SandboxState::Active);
        assert!(start_supervisord_session(&mock, &handle).await.is_err());
    }

    #[test]
    fn test_sandbox_params_fixed_configuration() {
        let mut config = Config::default();
        config.provider.target = Some("us".to_string());
        let params = sandbox_params(&config, "secret", None);

        assert_eq!(params.image, "adamcohenhillel/kortix-suna:0.0.20");
        assert!(params.public);
        assert!(params.labels.is_none());
        assert_eq!(params.ports, vec![6080, 5900, 5901, 9222, 8080, 8002]);
        assert_eq!(params.resources, SandboxResources { cpu: 2, memory: 4, disk: 5 });
        assert_eq!(params.target.as_deref(), Some("us"));
        assert_eq!(params.env.len(), 11);
        assert_eq!(params.env["VNC_PASSWORD"], "secret");
        assert_eq!(params.env["RESOLUTION"], "1024x768x24");
        assert_eq!(params.env["CHROME_DEBUGGING_PORT"], "9222");
        assert_eq!(params.env["CHROME_CDP"], "");
    }

    #[test]
    fn test_sandbox_params_label() {
        let params = sandbox_params(&Config::default(), "pw", Some("proj-7"));
        let labels = params.labels.unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels["id"], "proj-7");

        let params = sandbox_params(&Config::default(), "pw", Some(""));
        assert!(params.labels.is_none());
    }

    #[tokio::test]
    async fn test_create_sandbox_starts_supervisord() {
        let mock = MockProvider::with_state(SandboxState::Active);
        let handle = create_sandbox(&mock, &Config::default(), "pw", Some("proj-1"))
            .await
            .unwrap();

        assert_eq!(handle.id, "sb-created");
        let calls = mock.calls();
        assert!(matches!(&calls[0], Call::Create(p) if p.env["VNC_PASSWORD"] == "pw"));
        assert_eq!(&calls[1..], supervisord_calls("sb-created").as_slice());
    }

    #[tokio::test]
    async fn test_create_failure_propagates() {
        let mock = MockProvider::with_state(SandboxState::Active).failing(FailOn::Create);
        assert!(create_sandbox(&mock, &Config::default(), "pw", None).await.is_err());
        assert_eq!(mock.count(|c| matches!(c, Call::CreateSession(..))), 0);
    }
}
