//! CLI command implementations.
//!
//! Each submodule implements a sandboxer command. Formatting is pure and
//! returns strings; provider and store IO happens only in `run`.

pub mod config;
pub mod create;
pub mod ensure;
pub mod preview;
pub mod start;

use colored::Colorize;
use std::fmt::Write;

use sandboxer::sandbox::{SandboxHandle, SandboxState};

/// Render a handle as a status block with a title line.
pub fn format_sandbox(title: &str, sandbox: &SandboxHandle) -> String {
    let mut out = String::new();
    let _ = writeln!(&mut out, "\n{}", "━".repeat(50).dimmed());
    let _ = writeln!(&mut out, "{}", format!("   {title}").yellow().bold());
    let _ = writeln!(&mut out, "{}", "━".repeat(50).dimmed());

    let id = if sandbox.id.is_empty() {
        "(none)".to_string()
    } else {
        sandbox.id.clone()
    };
    let _ = writeln!(&mut out, "  Sandbox:    {}", id.cyan());

    let state = match sandbox.state {
        SandboxState::Active => "active".green().bold(),
        SandboxState::Stopped | SandboxState::Archived => sandbox.state.to_string().red(),
        SandboxState::Unknown => "unknown".yellow(),
    };
    let _ = writeln!(&mut out, "  State:      {state}");

    if let Some(target) = &sandbox.target {
        let _ = writeln!(&mut out, "  Target:     {}", target.cyan());
    }
    if let Some(created) = sandbox.created_at {
        let _ = writeln!(
            &mut out,
            "  Created:    {}",
            created.format("%Y-%m-%d %H:%M:%S UTC").to_string().cyan()
        );
    }
    for (key, value) in &sandbox.labels {
        let _ = writeln!(&mut out, "  Label:      {}={}", key, value.cyan());
    }

    let _ = writeln!(&mut out, "{}", "━".repeat(50).dimmed());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sandbox_shows_id_and_state() {
        let handle = SandboxHandle::new("sb-1", SandboxState::Active);
        let out = format_sandbox("Sandbox Ready", &handle);
        assert!(out.contains("Sandbox Ready"));
        assert!(out.contains("sb-1"));
        assert!(out.contains("active"));
        assert!(!out.contains("Target"));
    }

    #[test]
    fn test_format_sandbox_empty_id() {
        let handle = SandboxHandle::new("", SandboxState::Active);
        let out = format_sandbox("Created", &handle);
        assert!(out.contains("(none)"));
    }

    #[test]
    fn test_format_sandbox_labels() {
        let mut handle = SandboxHandle::new("sb-1", SandboxState::Stopped);
        handle.labels.insert("id".to_string(), "proj-1".to_string());
        let out = format_sandbox("Sandbox", &handle);
        assert!(out.contains("stopped"));
        assert!(out.contains("proj-1"));
    }
}
