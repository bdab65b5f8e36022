use super::{Backend, BackendKind};
use crate::error::{RepoError, Result};
use crate::types::{Commit, CommitDepth, Signature};
use chrono::{DateTime, Utc};
use git2::{ErrorCode, ObjectType, Oid, Repository, Tree};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Reference used when the caller passes an empty one
pub const DEFAULT_REFERENCE: &str = "HEAD";

/// Snapshot a bound [`GitBackend`] reads from
struct BoundRepo {
    repo: Repository,
    /// Tracked blobs by `/`-separated path, so reads never re-parse the path
    blobs: BTreeMap<String, Oid>,
}

/// Backend for a git repository on local disk.
///
/// The snapshot is the tree of the resolved commit, read straight from the
/// object database. Untracked or modified files in the working directory are
/// never visible.
pub struct GitBackend {
    locator: String,
    path: PathBuf,
    bound: Option<BoundRepo>,
}

impl GitBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            locator: path.display().to_string(),
            path,
            bound: None,
        }
    }

    /// Whether `path` is the root of a git repository (work tree or bare)
    pub fn is_repository(path: impl AsRef<Path>) -> bool {
        Repository::open(path.as_ref()).is_ok()
    }

    fn bound(&self) -> Result<&BoundRepo> {
        self.bound.as_ref().ok_or(RepoError::NotInitialized)
    }
}

/// Resolve a revision expression (`HEAD`, branch, tag, full or short SHA) to a commit
fn resolve_commit<'r>(repo: &'r Repository, reference: &str) -> Result<git2::Commit<'r>> {
    repo.revparse_single(reference)
        .and_then(|object| object.peel_to_commit())
        .map_err(|e| RepoError::reference(reference, e.message()))
}

fn to_datetime(time: git2::Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.seconds(), 0).unwrap_or_default()
}

fn to_signature(sig: &git2::Signature<'_>) -> Signature {
    Signature {
        name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
        when: to_datetime(sig.when()),
    }
}

/// Collect every blob below `tree`, keyed by its path.
///
/// Entry names are raw bytes in git. Non-UTF-8 names are decoded lossily for
/// the key, while the stored id still points at the real blob.
fn collect_blobs(
    repo: &Repository,
    tree: &Tree<'_>,
    prefix: &str,
    blobs: &mut BTreeMap<String, Oid>,
) -> Result<()> {
    for entry in tree.iter() {
        let name = String::from_utf8_lossy(entry.name_bytes());
        let path = if prefix.is_empty() {
            name.into_owned()
        } else {
            format!("{}/{}", prefix, name)
        };

        match entry.kind() {
            Some(ObjectType::Blob) => {
                blobs.insert(path, entry.id());
            }
            Some(ObjectType::Tree) => {
                let subtree = repo.find_tree(entry.id())?;
                collect_blobs(repo, &subtree, &path, blobs)?;
            }
            // Submodules show up as commit entries and have no content here
            _ => {}
        }
    }
    Ok(())
}

pub(crate) fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    Commit {
        sha: commit.id().to_string(),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        author: to_signature(&commit.author()),
        committer: to_signature(&commit.committer()),
        committed_date: to_datetime(commit.time()),
        parents: commit.parent_ids().map(|id| id.to_string()).collect(),
    }
}

impl Backend for GitBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Git
    }

    fn locator(&self) -> &str {
        &self.locator
    }

    fn bind(&mut self, reference: &str, depth: CommitDepth) -> Result<Option<String>> {
        if !self.path.exists() {
            return Err(RepoError::binding(&self.locator, "path does not exist"));
        }

        let repo = Repository::open(&self.path)
            .map_err(|e| RepoError::binding(&self.locator, e.message()))?;

        let reference = match reference.trim() {
            "" => DEFAULT_REFERENCE,
            other => other,
        };

        let (sha, blobs) = {
            let commit = resolve_commit(&repo, reference)?;
            let mut blobs = BTreeMap::new();
            collect_blobs(&repo, &commit.tree()?, "", &mut blobs)?;
            (commit.id(), blobs)
        };

        tracing::info!(
            "Bound git repository {} at {} ({}), depth {}",
            self.locator,
            reference,
            sha,
            depth
        );

        self.bound = Some(BoundRepo { repo, blobs });
        Ok(Some(sha.to_string()))
    }

    fn commit(&self, sha: &str) -> Result<Option<Commit>> {
        let bound = self.bound()?;
        let oid = Oid::from_str(sha).map_err(|e| RepoError::reference(sha, e.message()))?;

        match bound.repo.find_commit(oid) {
            Ok(commit) => Ok(Some(to_commit(&commit))),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        let bound = self.bound()?;
        // BTreeMap keys are already sorted
        let files: Vec<String> = bound.blobs.keys().cloned().collect();
        tracing::debug!("{} tracked files in {}", files.len(), self.locator);
        Ok(files)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let bound = self.bound()?;
        let oid = bound.blobs.get(path).ok_or_else(|| {
            RepoError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file is not tracked"),
            )
        })?;

        let blob = bound
            .repo
            .find_blob(*oid)
            .map_err(|e| RepoError::io(path, std::io::Error::other(e.message().to_string())))?;

        Ok(blob.content().to_vec())
    }

    fn release(&mut self) -> Result<()> {
        if self.bound.take().is_some() {
            tracing::debug!("Released git repository {}", self.locator);
        }
        Ok(())
    }
}
