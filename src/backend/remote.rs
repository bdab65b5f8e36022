use super::git::GitBackend;
use super::{Backend, BackendKind};
use crate::error::{RepoError, Result};
use crate::types::{Commit, CommitDepth};
use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Backend for a repository hosted elsewhere.
///
/// Binding clones the repository into a temporary directory (shallow when the
/// depth is bounded) and then serves everything from that clone through a
/// [`GitBackend`], so traversal and search behave exactly as for local
/// repositories. The clone is deleted on [`release`](Backend::release), on
/// drop, and when binding fails.
pub struct RemoteBackend {
    url: String,
    timeout: Option<Duration>,
    temp_root: Option<PathBuf>,
    checkout: Option<TempDir>,
    inner: Option<GitBackend>,
}

impl RemoteBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            temp_root: None,
            checkout: None,
            inner: None,
        }
    }

    /// Abort the clone when it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create temporary clones below `root` instead of the system temp dir
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Location of the temporary clone while bound
    pub fn checkout_path(&self) -> Option<&Path> {
        self.checkout.as_ref().map(|dir| dir.path())
    }

    fn inner(&self) -> Result<&GitBackend> {
        self.inner.as_ref().ok_or(RepoError::NotInitialized)
    }

    fn create_checkout_dir(&self) -> Result<TempDir> {
        let dir = match &self.temp_root {
            Some(root) => tempfile::Builder::new()
                .prefix("repo-client-")
                .tempdir_in(root),
            None => tempfile::Builder::new().prefix("repo-client-").tempdir(),
        };
        dir.map_err(|e| RepoError::io("temporary clone directory", e))
    }

    fn clone_into(&self, target: &Path, depth: CommitDepth) -> Result<()> {
        let started = Instant::now();
        let timed_out = Cell::new(false);
        let timed_out_flag = &timed_out;

        let mut callbacks = RemoteCallbacks::new();
        if let Some(limit) = self.timeout {
            callbacks.transfer_progress(move |_progress| {
                if started.elapsed() > limit {
                    timed_out_flag.set(true);
                    false
                } else {
                    true
                }
            });
        }

        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(callbacks);
        if let Some(limit) = depth.limit() {
            fetch.depth(i32::try_from(limit).unwrap_or(i32::MAX));
        }

        tracing::info!(
            "Cloning {} into {} (depth {})",
            self.url,
            target.display(),
            depth
        );

        let result = RepoBuilder::new()
            .bare(true)
            .fetch_options(fetch)
            .clone(&self.url, target);

        match result {
            Ok(_) => {
                tracing::info!("Cloned {} in {:?}", self.url, started.elapsed());
                Ok(())
            }
            Err(_) if timed_out.get() => Err(RepoError::binding(
                &self.url,
                format!("clone timed out after {:?}", started.elapsed()),
            )),
            Err(e) => Err(RepoError::binding(&self.url, e.message())),
        }
    }
}

impl Backend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn locator(&self) -> &str {
        &self.url
    }

    fn bind(&mut self, reference: &str, depth: CommitDepth) -> Result<Option<String>> {
        self.release()?;

        // Dropping `checkout` on any early return removes the partial clone
        let checkout = self.create_checkout_dir()?;
        self.clone_into(checkout.path(), depth)?;

        let mut inner = GitBackend::new(checkout.path());
        let sha = inner.bind(reference, depth)?;

        self.checkout = Some(checkout);
        self.inner = Some(inner);
        Ok(sha)
    }

    fn commit(&self, sha: &str) -> Result<Option<Commit>> {
        self.inner()?.commit(sha)
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        self.inner()?.tracked_files()
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.inner()?.read_file(path)
    }

    fn release(&mut self) -> Result<()> {
        if let Some(mut inner) = self.inner.take() {
            inner.release()?;
        }
        if let Some(checkout) = self.checkout.take() {
            let path = checkout.path().to_path_buf();
            checkout
                .close()
                .map_err(|e| RepoError::io(path.display().to_string(), e))?;
            tracing::debug!("Removed temporary clone {}", path.display());
        }
        Ok(())
    }
}

impl Drop for RemoteBackend {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!("Failed to remove temporary clone of {}: {}", self.url, e);
        }
    }
}
