//! Get-or-start provisioning of remote sandboxes for project-scoped tools.
//!
//! A project record names the sandbox its tools run in. Tools embed a
//! [`tool_base::SandboxToolsBase`], which looks the project up, starts the
//! sandbox if it was stopped or archived, and caches the handle. The
//! provider behind it is either the Daytona HTTP API or, with sandboxing
//! disabled, a no-op stand-in.

/// Configuration file and environment overrides.
pub mod config;
pub mod project;
pub mod sandbox;
pub mod tool_base;
