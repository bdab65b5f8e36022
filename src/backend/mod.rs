//! Backend abstraction over the physical storage of a repository
//!
//! A backend turns a locator into a bound, read-only snapshot and answers
//! three questions about it: which commits exist, which files are tracked,
//! and what those files contain. The [`RepoClient`](crate::client::RepoClient)
//! holds exactly one backend, chosen when the client is constructed.

use crate::error::Result;
use crate::types::{Commit, CommitDepth};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Plain on-disk tree without version control
pub mod directory;
/// Local git repository read through libgit2
pub mod git;
/// Ephemeral in-memory repository
pub mod memory;
/// Remote repository materialized as a temporary clone
pub mod remote;

pub use directory::DirectoryBackend;
pub use git::GitBackend;
pub use memory::MemoryBackend;
pub use remote::RemoteBackend;

/// Which kind of storage a backend reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Git,
    Directory,
    Remote,
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Git => "git",
            BackendKind::Directory => "directory",
            BackendKind::Remote => "remote",
            BackendKind::Memory => "memory",
        }
    }

    /// Whether this kind of storage carries commit history
    pub fn has_history(&self) -> bool {
        !matches!(self, BackendKind::Directory)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set every repository backend provides.
///
/// All methods except [`bind`](Backend::bind) expect a bound backend and
/// fail with [`RepoError::NotInitialized`](crate::error::RepoError::NotInitialized)
/// otherwise. Implementations are `Send` so independent clients can live on
/// separate threads; a single backend is never shared between threads.
pub trait Backend: Send {
    fn kind(&self) -> BackendKind;

    /// Path or URI this backend was created for
    fn locator(&self) -> &str;

    /// Resolve `reference` and bind the snapshot it points to.
    ///
    /// Returns the resolved commit identity, or `None` for storage without
    /// history. `depth` is a hint for backends that have to fetch history
    /// before they can serve it; the walker enforces the bound itself.
    fn bind(&mut self, reference: &str, depth: CommitDepth) -> Result<Option<String>>;

    /// Look up one commit by identity.
    ///
    /// `Ok(None)` means the commit is not present in the store, which happens
    /// at the boundary of a shallow clone.
    fn commit(&self, sha: &str) -> Result<Option<Commit>>;

    /// Paths of all tracked files at the bound snapshot, relative to the root
    /// and `/`-separated. Version-control metadata is never included.
    fn tracked_files(&self) -> Result<Vec<String>>;

    /// Full content of one tracked file at the bound snapshot
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Drop the bound snapshot and any temporary storage. Idempotent.
    fn release(&mut self) -> Result<()>;
}

/// Check that `path` stays inside the repository root
pub(crate) fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Convert a filesystem path below `root` into a `/`-separated relative path
pub(crate) fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
