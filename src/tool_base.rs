//! Shared sandbox access for project-scoped tools.
//!
//! Tools embed a [`SandboxToolsBase`] and call
//! [`ensure_sandbox`](SandboxToolsBase::ensure_sandbox) before touching the
//! sandbox. The first call looks the project up and resolves its sandbox;
//! the handle is then cached for the lifetime of the tool.

use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

use crate::project::ProjectStore;
use crate::sandbox::{
    get_or_start_sandbox, Result, SandboxError, SandboxHandle, SandboxPort, SandboxProvider,
};

/// Default working directory inside sandboxes.
pub const WORKSPACE_PATH: &str = "/workspace";

/// Set once the preview URLs have been shown in this process.
static URLS_PRINTED: AtomicBool = AtomicBool::new(false);

/// Lazily resolved, per-instance sandbox access for one project.
pub struct SandboxToolsBase {
    project_id: String,
    store: Arc<dyn ProjectStore>,
    provider: Arc<dyn SandboxProvider>,
    workspace_path: String,
    sandbox: Option<SandboxHandle>,
    sandbox_id: Option<String>,
    sandbox_pass: Option<String>,
}

impl SandboxToolsBase {
    /// Creates an unresolved base for `project_id`.
    pub fn new(
        project_id: impl Into<String>,
        store: Arc<dyn ProjectStore>,
        provider: Arc<dyn SandboxProvider>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            store,
            provider,
            workspace_path: WORKSPACE_PATH.to_string(),
            sandbox: None,
            sandbox_id: None,
            sandbox_pass: None,
        }
    }

    /// Overrides the workspace directory used by [`clean_path`](Self::clean_path).
    #[must_use]
    pub fn with_workspace_path(mut self, workspace_path: impl Into<String>) -> Self {
        self.workspace_path = workspace_path.into();
        self
    }

    /// The project this tool is bound to.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Working directory inside the sandbox.
    pub fn workspace_path(&self) -> &str {
        &self.workspace_path
    }

    /// The provider used for resolution and for tool operations.
    pub fn provider(&self) -> &dyn SandboxProvider {
        self.provider.as_ref()
    }

    /// Resolve the project's sandbox on first use and return the cached
    /// handle afterwards.
    ///
    /// Fails with [`SandboxError::ProjectNotFound`] or
    /// [`SandboxError::NoSandboxForProject`] when the record or its sandbox
    /// reference is missing. Nothing is cached when resolution fails.
    pub async fn ensure_sandbox(&mut self) -> Result<&SandboxHandle> {
        if self.sandbox.is_none() {
            match self.resolve().await {
                Ok(handle) => self.sandbox = Some(handle),
                Err(e) => {
                    error!(
                        project_id = %self.project_id,
                        "Error retrieving sandbox for project {}: {}",
                        self.project_id,
                        e
                    );
                    return Err(e);
                }
            }
        }
        self.sandbox()
    }

    async fn resolve(&mut self) -> Result<SandboxHandle> {
        let project = self
            .store
            .get_project(&self.project_id)
            .await?
            .ok_or_else(|| SandboxError::project_not_found(&self.project_id))?;

        let sandbox_id = project
            .sandbox_id()
            .ok_or_else(|| SandboxError::no_sandbox_for_project(&self.project_id))?
            .to_string();

        self.sandbox_id = Some(sandbox_id.clone());
        self.sandbox_pass = project.sandbox_pass().map(str::to_string);

        let handle = get_or_start_sandbox(self.provider.as_ref(), &sandbox_id).await?;
        announce_preview_urls(
            self.provider.as_ref(),
            &handle,
            &URLS_PRINTED,
            &mut std::io::stdout(),
        )
        .await?;
        Ok(handle)
    }

    /// The resolved sandbox handle.
    pub fn sandbox(&self) -> Result<&SandboxHandle> {
        self.sandbox
            .as_ref()
            .ok_or_else(|| SandboxError::not_initialized("Sandbox"))
    }

    /// The resolved sandbox id.
    pub fn sandbox_id(&self) -> Result<&str> {
        self.sandbox_id
            .as_deref()
            .ok_or_else(|| SandboxError::not_initialized("Sandbox ID"))
    }

    /// The sandbox's VNC password, if the project recorded one.
    pub fn sandbox_password(&self) -> Result<Option<&str>> {
        if self.sandbox.is_none() {
            return Err(SandboxError::not_initialized("Sandbox password"));
        }
        Ok(self.sandbox_pass.as_deref())
    }

    /// Normalize `path` to be relative to the workspace.
    pub fn clean_path(&self, path: &str) -> String {
        let cleaned = clean_path(path, &self.workspace_path);
        debug!("Cleaned path: {} -> {}", path, cleaned);
        cleaned
    }
}

/// Print the VNC and website preview URLs the first time any sandbox is
/// resolved in this process.
///
/// Returns whether anything was printed. Sandboxes without preview URLs
/// (the disabled provider) print nothing and leave `printed` unset.
pub(crate) async fn announce_preview_urls(
    provider: &dyn SandboxProvider,
    sandbox: &SandboxHandle,
    printed: &AtomicBool,
    out: &mut impl Write,
) -> Result<bool> {
    if printed.load(Ordering::SeqCst) {
        return Ok(false);
    }

    let vnc = provider
        .get_preview_link(sandbox, SandboxPort::Vnc.number())
        .await?;
    let website = provider
        .get_preview_link(sandbox, SandboxPort::Website.number())
        .await?;

    if vnc.url.is_empty() && website.url.is_empty() {
        return Ok(false);
    }

    if printed.swap(true, Ordering::SeqCst) {
        return Ok(false);
    }

    writeln!(out, "{}", "***".magenta())?;
    writeln!(out, "{}", format!("VNC URL: {}", vnc.url).magenta())?;
    writeln!(out, "{}", format!("Website URL: {}", website.url).magenta())?;
    writeln!(out, "{}", "***".magenta())?;
    Ok(true)
}

/// Strip the workspace prefix and leading slashes from `path` and drop
/// empty and `.` segments.
pub fn clean_path(path: &str, workspace_path: &str) -> String {
    let workspace = workspace_path.trim_matches('/');
    let mut rest = path.trim().trim_start_matches('/');

    if !workspace.is_empty() {
        if rest == workspace {
            rest = "";
        } else if let Some(stripped) = rest
            .strip_prefix(workspace)
            .and_then(|r| r.strip_prefix('/'))
        {
            rest = stripped;
        }
    }

    rest.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}
