//! RepoVitals Repository Collector
//!
//! Parses GitHub repository URLs and fetches repository metadata and source
//! files through the GitHub REST API.

pub mod github;
pub mod source;
pub mod url;

pub use github::GithubCollector;
pub use source::{RepoInfo, RepoSource, SourceFile};
pub use url::{parse_repo_url, RepoReference};

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Invalid GitHub repository URL: {0}")]
    InvalidUrl(String),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, CollectorError>;

/// Default size above which a file is listed without content
pub const DEFAULT_MAX_FILE_BYTES: u64 = 200_000;

/// Bounds on how much of a repository is pulled into one analysis run
#[derive(Debug, Clone)]
pub struct FetchLimits {
    /// Maximum number of files taken from the tree listing
    pub max_files: usize,
    /// Files larger than this are listed without content
    pub max_file_bytes: u64,
    /// Concurrent content requests
    pub concurrency: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_files: 300,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            concurrency: 8,
        }
    }
}

/// Configuration for collectors
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub github_token: Option<String>,
    pub user_agent: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub limits: FetchLimits,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            github_token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            user_agent: "RepoVitals/0.1 (https://github.com/repovitals/repovitals)".to_string(),
            api_base_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            request_timeout: Duration::from_secs(30),
            limits: FetchLimits::default(),
        }
    }
}
