//! Resolve a project's sandbox the way tools do, starting it if needed.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use sandboxer::config::Config;
use sandboxer::project::RestProjectStore;
use sandboxer::sandbox::provider_from_config;
use sandboxer::tool_base::SandboxToolsBase;

pub async fn run(config: &Config, project_id: &str) -> Result<()> {
    let timeout = Duration::from_secs(config.provider.timeout_secs);
    let store = RestProjectStore::from_config(&config.store, timeout)
        .context("Failed to set up project store")?;
    let provider = provider_from_config(config).context("Failed to set up sandbox provider")?;

    let mut base = SandboxToolsBase::new(project_id, Arc::new(store), provider)
        .with_workspace_path(config.sandbox.workspace_path.clone());

    let sandbox = base
        .ensure_sandbox()
        .await
        .with_context(|| format!("Failed to resolve sandbox for project {project_id}"))?;

    print!(
        "{}",
        super::format_sandbox(&format!("Project {project_id}"), sandbox)
    );
    Ok(())
}
