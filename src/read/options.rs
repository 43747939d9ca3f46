//! Extraction options.

pub use crate::safety::{PathSafety, ResourceLimits};

/// Policy for handling existing files during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Return [`Error::AlreadyExists`](crate::Error::AlreadyExists) if the
    /// file exists.
    Error,
    /// Skip files that already exist.
    Skip,
    /// Truncate and overwrite existing files.
    #[default]
    Overwrite,
}

/// Policy for handling symbolic link entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkPolicy {
    /// Do not create symbolic links; such entries are skipped and counted.
    #[default]
    Forbid,
    /// Create symbolic links whose targets stay inside the destination.
    ValidateTargets,
    /// Create all symbolic links as stored (use with caution).
    Allow,
}

/// Options for extraction operations.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Policy for handling existing files.
    pub overwrite: OverwritePolicy,
    /// Path safety validation policy.
    pub path_safety: PathSafety,
    /// Symbolic link handling policy.
    pub link_policy: LinkPolicy,
    /// Resource limits for extraction.
    pub limits: ResourceLimits,
    /// Restore Unix permission bits stored in entries.
    pub preserve_permissions: bool,
}

impl ExtractOptions {
    /// Creates extraction options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overwrite policy.
    pub fn overwrite(mut self, policy: OverwritePolicy) -> Self {
        self.overwrite = policy;
        self
    }

    /// Sets the path safety policy.
    pub fn path_safety(mut self, policy: PathSafety) -> Self {
        self.path_safety = policy;
        self
    }

    /// Sets the link policy.
    pub fn link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    /// Sets the resource limits.
    pub fn limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets whether stored Unix permissions are restored.
    pub fn preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }
}
