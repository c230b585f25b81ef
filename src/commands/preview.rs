//! Print the preview URL for a sandbox port.

use anyhow::{Context, Result};
use colored::Colorize;

use sandboxer::config::Config;
use sandboxer::sandbox::provider_from_config;

pub async fn run(config: &Config, sandbox_id: &str, port: u16) -> Result<()> {
    let provider = provider_from_config(config).context("Failed to set up sandbox provider")?;

    let sandbox = provider
        .get(sandbox_id)
        .await
        .with_context(|| format!("Failed to fetch sandbox {sandbox_id}"))?;
    let link = provider
        .get_preview_link(&sandbox, port)
        .await
        .with_context(|| format!("Failed to get preview link for port {port}"))?;

    if link.url.is_empty() {
        println!("\n{} No preview URL for port {}.", "ℹ".blue(), port);
        return Ok(());
    }

    println!("{}", link.url.green());
    if let Some(token) = link.token {
        println!("  Token: {}", token.cyan());
    }
    Ok(())
}
