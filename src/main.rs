use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repo_client::batch::{BatchJob, analyze_batch};
use repo_client::{Config, MatchMode, RepoClient, SearchRequest};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "repo-client",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " ", env!("REPO_CLIENT_BUILD_INFO")),
    about = "Inspect repository history and content for supply-chain checks"
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Starting reference for history and search
    #[arg(long, global = true, env = "REPO_CLIENT_REFERENCE")]
    reference: Option<String>,

    /// Commits to materialize; zero or negative means the full history
    #[arg(long, global = true, allow_negative_numbers = true)]
    depth: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List commits within the depth bound, newest first
    Commits {
        /// Repository path or URI
        locator: String,
    },
    /// Search tracked file content
    Search {
        /// Repository path or URI
        locator: String,
        query: String,
        /// Restrict to a directory, file or glob
        #[arg(long)]
        path: Option<String>,
        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,
        #[arg(short = 'i', long)]
        ignore_case: bool,
    },
    /// List tracked files
    Files {
        /// Repository path or URI
        locator: String,
        /// Only list paths containing this text
        #[arg(long)]
        contains: Option<String>,
    },
    /// Analyze several repositories in parallel
    Batch {
        /// Repository paths or URIs
        #[arg(required = true)]
        locators: Vec<String>,
        /// Search to run in every repository
        #[arg(long)]
        query: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default()?,
    };
    config.apply_env_overrides();

    if let Some(reference) = &cli.reference {
        config.client.reference = reference.clone();
    }
    if let Some(depth) = cli.depth {
        config.client.commit_depth = depth;
    }

    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open(locator: &str, config: &Config) -> Result<RepoClient> {
    let mut client = RepoClient::from_locator(locator, config)?;
    client
        .init_with_config(config)
        .with_context(|| format!("Failed to initialize {}", locator))?;
    Ok(client)
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Commits { locator } => {
            let mut client = open(locator, &config)?;
            print_json(&client.list_commits()?)?;
            client.close()?;
        }
        Command::Search {
            locator,
            query,
            path,
            regex,
            ignore_case,
        } => {
            let mut client = open(locator, &config)?;
            let mut request = SearchRequest::new(query.clone())
                .case_insensitive(*ignore_case || config.search.case_insensitive);
            if *regex {
                request = request.with_mode(MatchMode::Regex);
            }
            if let Some(path) = path {
                request = request.with_path(path.clone());
            }
            print_json(&client.search(&request)?)?;
            client.close()?;
        }
        Command::Files { locator, contains } => {
            let mut client = open(locator, &config)?;
            let files = client.list_files(|path| {
                contains
                    .as_deref()
                    .is_none_or(|needle| path.contains(needle))
            })?;
            print_json(&files)?;
            client.close()?;
        }
        Command::Batch { locators, query } => {
            let jobs: Vec<BatchJob> = locators
                .iter()
                .map(|locator| {
                    let job = BatchJob::new(locator.clone());
                    match query {
                        Some(q) => job.with_search(
                            SearchRequest::new(q.clone())
                                .case_insensitive(config.search.case_insensitive),
                        ),
                        None => job,
                    }
                })
                .collect();
            print_json(&analyze_batch(&jobs, &config))?;
        }
    }

    Ok(())
}
