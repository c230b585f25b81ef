//! Show the effective configuration after file and environment merging.

use anyhow::{Context, Result};

use sandboxer::config::Config;

const REDACTED: &str = "<redacted>";

/// Copy of `config` with credentials masked.
pub fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.provider.api_key.is_some() {
        shown.provider.api_key = Some(REDACTED.to_string());
    }
    if shown.store.key.is_some() {
        shown.store.key = Some(REDACTED.to_string());
    }
    shown
}

pub fn run(config: &Config) -> Result<()> {
    let rendered =
        toml::to_string_pretty(&redacted(config)).context("Failed to serialize config")?;
    print!("{rendered}");
    Ok(())
}
