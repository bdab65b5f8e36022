//! # Repo Client - repository access for supply-chain analysis
//!
//! Binds to a version-controlled source tree at a reference, exposes a
//! depth-bounded view of its commit history, and runs full-text content search
//! over the tracked files. Security checks built on top of this crate use it to
//! look for evidence in code and history; scoring and report rendering live
//! elsewhere.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │      RepoClient      │  init_repo / list_commits / search
//! └──────────┬───────────┘
//!            │ Box<dyn Backend>
//!    ┌───────┴──────┬──────────────┬──────────────┐
//!    │              │              │              │
//! ┌──▼──┐     ┌─────▼─────┐   ┌────▼───┐    ┌─────▼────┐
//! │ Git │     │ Directory │   │ Remote │    │  Memory  │
//! └─────┘     └───────────┘   └────────┘    └──────────┘
//!
//! CommitWalker ──► Backend::commit          (history)
//! ContentSearcher ──► Backend::tracked_files / read_file   (search)
//! ```
//!
//! ## Modules
//!
//! - [`client`]: The facade downstream code talks to
//! - [`backend`]: Backend trait and the git, directory, remote and memory variants
//! - [`history`]: Depth-bounded reverse-chronological commit walk
//! - [`search`]: Substring and regex search over the tracked file set
//! - [`batch`]: Parallel analysis of many repositories
//! - [`config`]: Configuration management with environment variable support
//! - [`types`]: Commit and search value types
//! - [`error`]: Error types and result aliases
//!
//! ## Usage Example
//!
//! ```no_run
//! use repo_client::{RepoClient, SearchRequest};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut client = RepoClient::open_local(".")?;
//!     client.init_repo("HEAD", 1)?;
//!
//!     let commits = client.list_commits()?;
//!     let response = client.search(&SearchRequest::new("TODO"))?;
//!     println!("{} commits, {} hits", commits.len(), response.hits);
//!     Ok(())
//! }
//! ```

/// Repository backends: local git, plain directory, remote clone, in-memory
pub mod backend;

/// Parallel analysis of many repositories
pub mod batch;

/// Repository client facade
pub mod client;

/// Configuration management with environment variable overrides
pub mod config;

/// Error types and utilities
pub mod error;

/// Commit history walking
pub mod history;

/// Content search over tracked files
pub mod search;

/// Commit and search value types
pub mod types;

pub use backend::{Backend, BackendKind};
pub use client::{RepoClient, RepoHandle};
pub use config::Config;
pub use error::{RepoError, Result};
pub use types::{Commit, CommitDepth, MatchMode, SearchRequest, SearchResponse, SearchResult};
