use crate::backend::Backend;
use crate::error::{RepoError, Result};
use crate::types::{Commit, CommitDepth};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

/// A commit waiting in the walk queue
struct Pending {
    committed: DateTime<Utc>,
    /// Discovery order, breaks ties between equal timestamps
    seq: u64,
    commit: Commit,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Max-heap: newest first, then earliest discovered
    fn cmp(&self, other: &Self) -> Ordering {
        self.committed
            .cmp(&other.committed)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Reverse-chronological history walker over a bound backend
pub struct CommitWalker<'b> {
    backend: &'b dyn Backend,
}

impl<'b> CommitWalker<'b> {
    pub fn new(backend: &'b dyn Backend) -> Self {
        Self { backend }
    }

    /// Materialize the commits reachable from `start`, newest first.
    ///
    /// All parents are followed, and each identity is emitted at most once
    /// even when merge histories reach it along several paths. The walk ends
    /// after `depth` commits or when no ancestors remain. Parents missing
    /// from the store (shallow clone boundary) end their branch of the walk.
    pub fn walk(&self, start: &str, depth: CommitDepth) -> Result<Vec<Commit>> {
        let first = self.backend.commit(start)?.ok_or_else(|| {
            RepoError::reference(start, "commit is not present in the object store")
        })?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut queue = BinaryHeap::new();
        let mut seq = 0u64;

        seen.insert(first.sha.clone());
        queue.push(Pending {
            committed: first.committed_date,
            seq,
            commit: first,
        });

        let mut commits = Vec::new();
        while let Some(Pending { commit, .. }) = queue.pop() {
            let parents = commit.parents.clone();
            commits.push(commit);

            if depth.is_reached(commits.len()) {
                break;
            }

            for parent in parents {
                if !seen.insert(parent.clone()) {
                    continue;
                }
                match self.backend.commit(&parent)? {
                    Some(parent_commit) => {
                        seq += 1;
                        queue.push(Pending {
                            committed: parent_commit.committed_date,
                            seq,
                            commit: parent_commit,
                        });
                    }
                    None => tracing::debug!("Parent {} not in store, stopping this branch", parent),
                }
            }

            if commits.len() % 500 == 0 {
                tracing::debug!("Walked {} commits", commits.len());
            }
        }

        tracing::info!(
            "Materialized {} commits from {} (depth {})",
            commits.len(),
            start,
            depth
        );
        Ok(commits)
    }
}
