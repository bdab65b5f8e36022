//! Value types shared between the client, the walker and the search engine
//!
//! These are plain data records. They derive serde traits so the finding
//! renderer can serialize them, but this crate defines no wire format of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author or committer identity attached to a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<Utc>,
}

/// One version-control commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full content-addressed hash (40 hex characters for SHA-1 repositories)
    pub sha: String,
    /// Full commit message, summary and body
    pub message: String,
    pub author: Signature,
    pub committer: Signature,
    /// Committer timestamp, used to order the history walk
    pub committed_date: DateTime<Utc>,
    /// Hashes of parent commits, first parent first
    #[serde(default)]
    pub parents: Vec<String>,
}

impl Commit {
    /// First line of the commit message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// How the query of a [`SearchRequest`] is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Plain substring match
    #[default]
    Literal,
    /// Regular expression (`regex` crate syntax)
    Regex,
}

/// Request to search tracked file content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Text to look for; must not be empty
    pub query: String,
    /// Optional glob or directory prefix restricting which files are searched
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub mode: MatchMode,
    #[serde(default)]
    pub case_insensitive: bool,
}

impl SearchRequest {
    /// Case-sensitive literal search across all tracked files
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            path: None,
            mode: MatchMode::Literal,
            case_insensitive: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }
}

/// A file in which at least one match occurred
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SearchResult {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
}

/// Outcome of a content search
///
/// `results` holds one entry per matching file, sorted by path. `hits` counts
/// every occurrence, so it is at least `results.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub hits: usize,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Paths of all matching files, in result order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|r| r.path.as_str())
    }
}

/// History horizon requested at bind time.
///
/// Callers pass a signed integer. Any value `<= 0` means "no bound": the
/// whole reachable history is materialized. This is intentionally permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitDepth(Option<usize>);

impl CommitDepth {
    pub const UNBOUNDED: CommitDepth = CommitDepth(None);

    pub fn from_raw(depth: i64) -> Self {
        if depth <= 0 {
            Self::UNBOUNDED
        } else {
            CommitDepth(Some(usize::try_from(depth).unwrap_or(usize::MAX)))
        }
    }

    /// Maximum number of commits to materialize, `None` when unbounded
    pub fn limit(&self) -> Option<usize> {
        self.0
    }

    pub fn is_bounded(&self) -> bool {
        self.0.is_some()
    }

    /// Whether `count` commits already exhaust this bound
    pub fn is_reached(&self, count: usize) -> bool {
        self.0.is_some_and(|max| count >= max)
    }
}

impl From<i64> for CommitDepth {
    fn from(depth: i64) -> Self {
        Self::from_raw(depth)
    }
}

impl std::fmt::Display for CommitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{}", n),
            None => f.write_str("unbounded"),
        }
    }
}

#[cfg(test)]
mod tests;
