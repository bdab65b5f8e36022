//! Content search over the tracked files of a bound snapshot
//!
//! Matching is byte-oriented so files that are not valid UTF-8 are searched
//! too. Every non-overlapping occurrence counts toward `hits`; each file with
//! at least one occurrence contributes exactly one result.

use crate::backend::Backend;
use crate::error::{RepoError, Result};
use crate::types::{MatchMode, SearchRequest, SearchResponse, SearchResult};
use globset::{GlobBuilder, GlobMatcher};
use regex::bytes::{Regex, RegexBuilder};

/// Compiled program limit for user-supplied regular expressions
const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Program budget per query byte in literal mode (case folding included)
const LITERAL_BYTES_PER_CHAR: usize = 1024;

/// Restricts a search to part of the tree
#[derive(Debug, Clone)]
enum PathFilter {
    /// Exact file or directory prefix, e.g. `src` or `.github/workflows`
    Prefix(String),
    Glob(GlobMatcher),
}

impl PathFilter {
    fn parse(pattern: &str) -> Result<Option<Self>> {
        let pattern = pattern.trim().trim_start_matches("./").trim_end_matches('/');
        if pattern.is_empty() {
            return Ok(None);
        }

        if pattern.contains(['*', '?', '[', '{']) {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| RepoError::Search(format!("invalid path pattern: {}", e)))?;
            Ok(Some(PathFilter::Glob(glob.compile_matcher())))
        } else {
            Ok(Some(PathFilter::Prefix(pattern.to_string())))
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            PathFilter::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            PathFilter::Glob(glob) => glob.is_match(path),
        }
    }
}

/// Compiled form of a [`SearchRequest`]
#[derive(Debug, Clone)]
pub struct ContentSearcher {
    matcher: Regex,
    path_filter: Option<PathFilter>,
}

impl ContentSearcher {
    /// Validate and compile a request.
    ///
    /// Fails with [`RepoError::Search`] for an empty query, an invalid
    /// regular expression or path pattern, and for a pattern that matches
    /// the empty string.
    pub fn new(request: &SearchRequest) -> Result<Self> {
        if request.query.is_empty() {
            return Err(RepoError::Search("query must not be empty".to_string()));
        }

        let (pattern, size_limit) = match request.mode {
            // A literal compiles to a program linear in its length, so any
            // length is accepted
            MatchMode::Literal => (
                regex::escape(&request.query),
                DEFAULT_SIZE_LIMIT
                    .max(request.query.len().saturating_mul(LITERAL_BYTES_PER_CHAR)),
            ),
            MatchMode::Regex => (request.query.clone(), DEFAULT_SIZE_LIMIT),
        };

        let matcher = RegexBuilder::new(&pattern)
            .case_insensitive(request.case_insensitive)
            .size_limit(size_limit)
            .build()
            .map_err(|e| RepoError::Search(format!("invalid pattern: {}", e)))?;

        if matcher.is_match(b"") {
            return Err(RepoError::Search(format!(
                "pattern '{}' matches empty input",
                request.query
            )));
        }

        let path_filter = match &request.path {
            Some(path) => PathFilter::parse(path)?,
            None => None,
        };

        Ok(Self {
            matcher,
            path_filter,
        })
    }

    /// Whether a tracked file falls inside the requested path restriction
    pub fn includes_path(&self, path: &str) -> bool {
        self.path_filter
            .as_ref()
            .is_none_or(|filter| filter.matches(path))
    }

    /// Number of non-overlapping occurrences in `content`
    pub fn count_matches(&self, content: &[u8]) -> usize {
        self.matcher.find_iter(content).count()
    }

    /// Scan every tracked file of the bound snapshot.
    ///
    /// Any unreadable file fails the whole search; partial results are never
    /// returned.
    pub fn search(&self, backend: &dyn Backend) -> Result<SearchResponse> {
        let mut results = Vec::new();
        let mut hits = 0usize;
        let mut scanned = 0usize;

        for path in backend.tracked_files()? {
            if !self.includes_path(&path) {
                continue;
            }

            let content = backend.read_file(&path)?;
            scanned += 1;

            let count = self.count_matches(&content);
            if count > 0 {
                tracing::debug!("{} matches in {}", count, path);
                hits += count;
                results.push(SearchResult { path });
            }
        }

        // Backends enumerate in their own order
        results.sort();
        results.dedup();

        tracing::info!(
            "Search scanned {} files: {} hits in {} files",
            scanned,
            hits,
            results.len()
        );

        Ok(SearchResponse { results, hits })
    }
}

/// Compile `request` and run it against `backend`
pub fn search(backend: &dyn Backend, request: &SearchRequest) -> Result<SearchResponse> {
    ContentSearcher::new(request)?.search(backend)
}

#[cfg(test)]
mod tests;
