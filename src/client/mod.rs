//! Repository client facade
//!
//! This module provides the single entry point downstream checks use: bind a
//! backend to a reference and depth with [`RepoClient::init_repo`], then call
//! [`RepoClient::list_commits`] and [`RepoClient::search`] against that bound
//! state.

use crate::backend::{
    Backend, BackendKind, DirectoryBackend, GitBackend, MemoryBackend, RemoteBackend,
};
use crate::config::Config;
use crate::error::{RepoError, Result};
use crate::history::CommitWalker;
use crate::search::ContentSearcher;
use crate::types::{Commit, CommitDepth, SearchRequest, SearchResponse};
use serde::Serialize;
use std::path::Path;

/// Binding created by [`RepoClient::init_repo`].
///
/// Immutable for its whole lifetime; binding again requires closing first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoHandle {
    pub locator: String,
    /// Reference as requested by the caller
    pub reference: String,
    /// Commit the reference resolved to; `None` for storage without history
    pub resolved_sha: Option<String>,
    #[serde(serialize_with = "serialize_depth")]
    pub depth: CommitDepth,
    pub backend: BackendKind,
}

fn serialize_depth<S: serde::Serializer>(
    depth: &CommitDepth,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match depth.limit() {
        Some(n) => serializer.serialize_u64(n as u64),
        None => serializer.serialize_none(),
    }
}

/// Whether a locator names a repository that has to be cloned first
pub fn is_remote_locator(locator: &str) -> bool {
    const SCHEMES: [&str; 5] = ["http://", "https://", "ssh://", "git://", "file://"];
    SCHEMES.iter().any(|scheme| locator.starts_with(scheme))
        || (locator.starts_with("git@") && locator.contains(':'))
}

/// Main client for reading one repository
///
/// The client owns exactly one backend and at most one [`RepoHandle`]. It is
/// `Send`, so independent clients can be driven from separate threads, but a
/// single client must not be used concurrently.
///
/// # Example
///
/// ```no_run
/// use repo_client::{RepoClient, SearchRequest};
///
/// fn main() -> anyhow::Result<()> {
///     let mut client = RepoClient::open_local("/path/to/repo")?;
///     client.init_repo("HEAD", 30)?;
///
///     for commit in client.list_commits()? {
///         println!("{} {}", commit.sha, commit.summary());
///     }
///
///     let response = client.search(&SearchRequest::new("curl | sh"))?;
///     println!("{} hits in {} files", response.hits, response.results.len());
///
///     client.close()?;
///     Ok(())
/// }
/// ```
pub struct RepoClient {
    backend: Box<dyn Backend>,
    handle: Option<RepoHandle>,
}

impl RepoClient {
    /// Create a client around an explicit backend
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            handle: None,
        }
    }

    /// Client for an ephemeral in-memory repository
    pub fn in_memory(backend: MemoryBackend) -> Self {
        Self::new(Box::new(backend))
    }

    /// Client for a path on local disk.
    ///
    /// A git repository root gets the git backend; any other directory is
    /// read as a plain tree without history. A path that does not exist is
    /// still accepted here and reported by [`init_repo`](Self::init_repo).
    pub fn open_local(locator: impl AsRef<Path>) -> Result<Self> {
        let path = locator.as_ref();
        if path.as_os_str().is_empty() {
            return Err(RepoError::binding("", "locator must not be empty"));
        }

        let backend: Box<dyn Backend> = if path.is_dir() && !GitBackend::is_repository(path) {
            Box::new(DirectoryBackend::new(path))
        } else {
            Box::new(GitBackend::new(path))
        };
        Ok(Self::new(backend))
    }

    /// Client for a path or URI, cloning remote locators as configured
    pub fn from_locator(locator: &str, config: &Config) -> Result<Self> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(RepoError::binding(locator, "locator must not be empty"));
        }

        if is_remote_locator(locator) {
            let mut backend =
                RemoteBackend::new(locator).with_timeout(config.remote.clone_timeout());
            if let Some(dir) = &config.remote.temp_dir {
                backend = backend.with_temp_root(dir);
            }
            Ok(Self::new(Box::new(backend)))
        } else {
            Self::open_local(locator)
        }
    }

    /// Bind the backend to `reference`, materializing at most `depth` commits.
    ///
    /// `depth <= 0` is not an error: it means the full reachable history.
    /// Fails with [`RepoError::Binding`] when the locator is not a readable
    /// repository and [`RepoError::Reference`] when the reference does not
    /// resolve. Any partially created state is released before returning an
    /// error.
    pub fn init_repo(&mut self, reference: &str, depth: i64) -> Result<&RepoHandle> {
        if let Some(handle) = &self.handle {
            return Err(RepoError::AlreadyInitialized(handle.locator.clone()));
        }

        let depth = CommitDepth::from_raw(depth);
        let resolved_sha = match self.backend.bind(reference, depth) {
            Ok(sha) => sha,
            Err(e) => {
                if let Err(release_err) = self.backend.release() {
                    tracing::warn!(
                        "Failed to release {} after bind error: {}",
                        self.backend.locator(),
                        release_err
                    );
                }
                return Err(e);
            }
        };

        let handle = RepoHandle {
            locator: self.backend.locator().to_string(),
            reference: reference.to_string(),
            resolved_sha,
            depth,
            backend: self.backend.kind(),
        };
        tracing::info!(
            "Initialized {} repository {} at {:?}",
            handle.backend,
            handle.locator,
            handle.resolved_sha
        );

        Ok(self.handle.insert(handle))
    }

    /// Bind using the reference and depth from `config`
    pub fn init_with_config(&mut self, config: &Config) -> Result<&RepoHandle> {
        self.init_repo(&config.client.reference, config.client.commit_depth)
    }

    /// The current binding, if any
    pub fn handle(&self) -> Option<&RepoHandle> {
        self.handle.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    fn bound_handle(&self) -> Result<&RepoHandle> {
        self.handle.as_ref().ok_or(RepoError::NotInitialized)
    }

    /// Commits within the depth bound, newest first from the bound reference
    pub fn list_commits(&self) -> Result<Vec<Commit>> {
        let handle = self.bound_handle()?;
        let Some(start) = &handle.resolved_sha else {
            return Err(RepoError::Unsupported {
                backend: handle.backend.as_str(),
                operation: "commit history",
            });
        };

        CommitWalker::new(self.backend.as_ref()).walk(start, handle.depth)
    }

    /// Search tracked file content at the bound snapshot.
    ///
    /// Independent of the depth bound. Repeated calls with the same request
    /// return identical responses.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.bound_handle()?;
        ContentSearcher::new(request)?.search(self.backend.as_ref())
    }

    /// Tracked file paths accepted by `predicate`, sorted
    pub fn list_files<F>(&self, predicate: F) -> Result<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        self.bound_handle()?;
        let mut files: Vec<String> = self
            .backend
            .tracked_files()?
            .into_iter()
            .filter(|path| predicate(path))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Content of one tracked file at the bound snapshot
    pub fn file_content(&self, path: &str) -> Result<Vec<u8>> {
        self.bound_handle()?;
        self.backend.read_file(path)
    }

    /// Release the binding and any temporary storage.
    ///
    /// Later calls fail with [`RepoError::NotInitialized`] until the client
    /// is bound again. Closing an unbound client is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            tracing::debug!("Closing {}", handle.locator);
            self.backend.release()?;
        }
        Ok(())
    }
}

impl Drop for RepoClient {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to release {}: {}", self.backend.locator(), e);
        }
    }
}
