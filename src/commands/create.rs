//! Create a new sandbox with the standard browser/VNC environment.

use anyhow::{Context, Result};
use colored::Colorize;

use sandboxer::config::Config;
use sandboxer::sandbox::{create_sandbox, provider_from_config};

/// Random VNC password for when none is given.
pub fn generate_password() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub async fn run(config: &Config, password: Option<String>, label: Option<String>) -> Result<()> {
    let provider = provider_from_config(config).context("Failed to set up sandbox provider")?;
    let generated = password.is_none();
    let password = password.unwrap_or_else(generate_password);

    let sandbox = create_sandbox(provider.as_ref(), config, &password, label.as_deref())
        .await
        .context("Failed to create sandbox")?;

    print!("{}", super::format_sandbox("Sandbox created", &sandbox));
    if generated {
        println!("  Password:   {}", password.cyan());
    }
    Ok(())
}
