//! Get-or-start a sandbox by id.

use anyhow::{Context, Result};

use sandboxer::config::Config;
use sandboxer::sandbox::{get_or_start_sandbox, provider_from_config};

pub async fn run(config: &Config, sandbox_id: &str) -> Result<()> {
    let provider = provider_from_config(config).context("Failed to set up sandbox provider")?;

    let sandbox = get_or_start_sandbox(provider.as_ref(), sandbox_id)
        .await
        .with_context(|| format!("Failed to get or start sandbox {sandbox_id}"))?;

    print!(
        "{}",
        super::format_sandbox(&format!("Sandbox ready ({})", provider.name()), &sandbox)
    );
    Ok(())
}
