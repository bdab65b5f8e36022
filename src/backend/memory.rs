use super::{Backend, BackendKind};
use crate::error::{RepoError, Result};
use crate::types::{Commit, CommitDepth, Signature};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

/// A commit plus the full file snapshot it points to
#[derive(Debug, Clone)]
struct StoredCommit {
    commit: Commit,
    files: BTreeMap<String, Vec<u8>>,
}

/// Ephemeral repository held entirely in memory.
///
/// Useful for callers that already have content at hand, and for exercising
/// the walker and search engine without touching disk. Commit identities are
/// synthetic 40-character hex strings assigned in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    name: String,
    commits: HashMap<String, StoredCommit>,
    refs: HashMap<String, String>,
    bound: Option<String>,
    next_id: u64,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commits: HashMap::new(),
            refs: HashMap::new(),
            bound: None,
            next_id: 1,
        }
    }

    /// Record a commit and move `HEAD` to it.
    ///
    /// The snapshot starts from the first parent's files (if any) and then
    /// applies `files`, so each commit only lists what it adds or changes.
    pub fn add_commit<'a>(
        &mut self,
        parents: &[&str],
        message: &str,
        timestamp: i64,
        files: impl IntoIterator<Item = (&'a str, &'a [u8])>,
    ) -> String {
        let sha = format!("{:040x}", self.next_id);
        self.next_id += 1;
        let when: DateTime<Utc> = DateTime::from_timestamp(timestamp, 0).unwrap_or_default();
        let signature = Signature {
            name: "Memory Author".to_string(),
            email: "memory@localhost".to_string(),
            when,
        };

        let mut snapshot = parents
            .first()
            .and_then(|p| self.commits.get(*p))
            .map(|stored| stored.files.clone())
            .unwrap_or_default();
        for (path, content) in files {
            snapshot.insert(path.to_string(), content.to_vec());
        }

        let commit = Commit {
            sha: sha.clone(),
            message: message.to_string(),
            author: signature.clone(),
            committer: signature,
            committed_date: when,
            parents: parents.iter().map(|p| p.to_string()).collect(),
        };

        self.commits.insert(
            sha.clone(),
            StoredCommit {
                commit,
                files: snapshot,
            },
        );
        self.refs.insert("HEAD".to_string(), sha.clone());
        sha
    }

    /// Point a named reference (branch, tag) at a commit
    pub fn set_ref(&mut self, name: impl Into<String>, sha: impl Into<String>) {
        self.refs.insert(name.into(), sha.into());
    }

    /// Forget a commit while keeping references to it in its children,
    /// mimicking the boundary of a shallow clone
    pub fn prune_commit(&mut self, sha: &str) {
        self.commits.remove(sha);
    }

    fn bound_snapshot(&self) -> Result<&BTreeMap<String, Vec<u8>>> {
        let sha = self.bound.as_ref().ok_or(RepoError::NotInitialized)?;
        self.commits
            .get(sha)
            .map(|stored| &stored.files)
            .ok_or_else(|| RepoError::other(format!("bound commit {} disappeared", sha)))
    }

    fn resolve(&self, reference: &str) -> Option<String> {
        if let Some(sha) = self.refs.get(reference) {
            return Some(sha.clone());
        }
        if self.commits.contains_key(reference) {
            return Some(reference.to_string());
        }
        // Unambiguous identity prefix
        let mut matches = self.commits.keys().filter(|sha| sha.starts_with(reference));
        match (matches.next(), matches.next()) {
            (Some(sha), None) if reference.len() >= 4 => Some(sha.clone()),
            _ => None,
        }
    }
}

impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn locator(&self) -> &str {
        &self.name
    }

    fn bind(&mut self, reference: &str, _depth: CommitDepth) -> Result<Option<String>> {
        let reference = match reference.trim() {
            "" => "HEAD",
            other => other,
        };
        let sha = self
            .resolve(reference)
            .ok_or_else(|| RepoError::reference(reference, "no such commit or reference"))?;
        self.bound = Some(sha.clone());
        Ok(Some(sha))
    }

    fn commit(&self, sha: &str) -> Result<Option<Commit>> {
        if self.bound.is_none() {
            return Err(RepoError::NotInitialized);
        }
        Ok(self.commits.get(sha).map(|stored| stored.commit.clone()))
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        // BTreeMap keys are already sorted
        Ok(self.bound_snapshot()?.keys().cloned().collect())
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.bound_snapshot()?.get(path).cloned().ok_or_else(|| {
            RepoError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file is not tracked"),
            )
        })
    }

    fn release(&mut self) -> Result<()> {
        self.bound = None;
        Ok(())
    }
}
