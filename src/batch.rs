//! Concurrent analysis of many repositories
//!
//! Each job gets its own [`RepoClient`] on the rayon thread pool. Clients share
//! nothing, so there is no locking; temporary clones are released as soon as a
//! job finishes, whether it succeeded or not.

use crate::client::RepoClient;
use crate::config::Config;
use crate::error::Result;
use crate::types::{SearchRequest, SearchResponse};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One repository to analyze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    /// Path or URI of the repository
    pub locator: String,
    /// Overrides `client.reference` from the config
    #[serde(default)]
    pub reference: Option<String>,
    /// Overrides `client.commit_depth` from the config
    #[serde(default)]
    pub commit_depth: Option<i64>,
    /// Optional content search to run on the snapshot
    #[serde(default)]
    pub search: Option<SearchRequest>,
}

impl BatchJob {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            reference: None,
            commit_depth: None,
            search: None,
        }
    }

    pub fn with_search(mut self, request: SearchRequest) -> Self {
        self.search = Some(request);
        self
    }
}

/// Result of one job; exactly one of the data fields or `error` is meaningful
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub locator: String,
    /// Resolved commit, when the backend has history
    pub resolved_sha: Option<String>,
    /// Number of commits within the depth bound, when the backend has history
    pub commit_count: Option<usize>,
    pub search: Option<SearchResponse>,
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn run_job(job: &BatchJob, config: &Config) -> Result<BatchOutcome> {
    let mut client = RepoClient::from_locator(&job.locator, config)?;

    let reference = job
        .reference
        .as_deref()
        .unwrap_or(config.client.reference.as_str());
    let depth = job.commit_depth.unwrap_or(config.client.commit_depth);
    let (resolved_sha, has_history) = {
        let handle = client.init_repo(reference, depth)?;
        (handle.resolved_sha.clone(), handle.backend.has_history())
    };

    let commit_count = if has_history {
        Some(client.list_commits()?.len())
    } else {
        None
    };

    let search = match &job.search {
        Some(request) => Some(client.search(request)?),
        None => None,
    };

    client.close()?;

    Ok(BatchOutcome {
        locator: job.locator.clone(),
        resolved_sha,
        commit_count,
        search,
        error: None,
    })
}

/// Analyze every job in parallel; outcomes keep the order of `jobs`
pub fn analyze_batch(jobs: &[BatchJob], config: &Config) -> Vec<BatchOutcome> {
    tracing::info!("Analyzing {} repositories", jobs.len());

    jobs.par_iter()
        .map(|job| {
            run_job(job, config).unwrap_or_else(|e| {
                tracing::warn!("Analysis of {} failed: {}", job.locator, e);
                BatchOutcome {
                    locator: job.locator.clone(),
                    resolved_sha: None,
                    commit_count: None,
                    search: None,
                    error: Some(e.to_string()),
                }
            })
        })
        .collect()
}
