//! GitHub API collector

use crate::source::{RepoInfo, RepoSource, SourceFile};
use crate::{CollectorConfig, CollectorError, FetchLimits, RepoReference, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::TryFutureExt;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

const API_VERSION: &str = "2022-11-28";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

/// Directories that hold vendored, generated or cached files
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "dist",
    "build",
    "target",
    ".git",
    "third_party",
    "coverage",
    "__pycache__",
    ".next",
    ".venv",
];

/// Extensions never worth fetching as text
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg", "mp3", "mp4", "mov", "wav",
    "avi", "zip", "gz", "tgz", "tar", "bz2", "xz", "7z", "rar", "jar", "war", "pdf", "doc",
    "docx", "xls", "xlsx", "ppt", "pptx", "woff", "woff2", "ttf", "otf", "eot", "so", "dll",
    "dylib", "exe", "bin", "o", "a", "class", "pyc", "wasm", "db", "sqlite",
];

/// GitHub API client
pub struct GithubCollector {
    client: Client,
    config: CollectorConfig,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    full_name: String,
    description: Option<String>,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    size: u64,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    license: Option<LicenseResponse>,
    #[serde(default)]
    archived: bool,
    pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct LicenseResponse {
    key: String,
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    size: Option<u64>,
}

impl From<RepoResponse> for RepoInfo {
    fn from(repo: RepoResponse) -> Self {
        let license = repo.license.map(|l| match l.spdx_id {
            Some(id) if id != "NOASSERTION" => id,
            _ => l.key,
        });

        Self {
            name: repo.name,
            full_name: repo.full_name,
            description: repo.description.filter(|d| !d.trim().is_empty()),
            default_branch: repo.default_branch,
            size_kb: repo.size,
            language: repo.language,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
            license,
            archived: repo.archived,
            pushed_at: repo.pushed_at,
        }
    }
}

impl GithubCollector {
    /// Create a new GitHub collector
    pub fn new(config: CollectorConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            HeaderName::from_static("x-github-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(USER_AGENT, header_value(&config.user_agent)?);

        if let Some(ref token) = config.github_token {
            headers.insert(AUTHORIZATION, header_value(&format!("Bearer {}", token))?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    async fn get_repo(&self, repo: &RepoReference) -> Result<RepoResponse> {
        let url = self.api_url(&["repos", repo.owner.as_str(), repo.repo.as_str()])?;

        let response = self.client.get(url).send().await?;
        self.check_rate_limit(&response)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CollectorError::RepoNotFound(repo.full_name()));
        }
        if !response.status().is_success() {
            return Err(CollectorError::Fetch(format!(
                "GitHub API error: {} for {}",
                response.status(),
                repo
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CollectorError::Fetch(format!("Invalid repository metadata: {}", e)))
    }

    async fn get_tree(&self, repo: &RepoReference) -> Result<TreeResponse> {
        let mut url = self.api_url(&[
            "repos",
            repo.owner.as_str(),
            repo.repo.as_str(),
            "git",
            "trees",
            "HEAD",
        ])?;
        url.query_pairs_mut().append_pair("recursive", "1");

        let response = self.client.get(url).send().await?;
        self.check_rate_limit(&response)?;

        // An empty repository has no HEAD tree
        if response.status() == StatusCode::CONFLICT {
            return Ok(TreeResponse {
                tree: Vec::new(),
                truncated: false,
            });
        }
        if response.status() == StatusCode::NOT_FOUND {
            return Err(CollectorError::RepoNotFound(repo.full_name()));
        }
        if !response.status().is_success() {
            return Err(CollectorError::Fetch(format!(
                "GitHub API error: {} listing files of {}",
                response.status(),
                repo
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CollectorError::Fetch(format!("Invalid tree listing: {}", e)))
    }

    async fn list_files(&self, repo: &RepoReference) -> Result<Vec<TreeEntry>> {
        let tree = self.get_tree(repo).await?;
        if tree.truncated {
            warn!(repo = %repo, "Tree listing truncated by GitHub, analyzing partial file set");
        }

        let total = tree.tree.len();
        let selected = select_entries(tree.tree, &self.config.limits);
        info!(repo = %repo, total = total, selected = selected.len(), "Listed repository files");

        Ok(selected)
    }

    async fn fetch_entry(&self, repo: &RepoReference, entry: TreeEntry) -> Result<SourceFile> {
        let size = entry.size.unwrap_or(0);
        if size > self.config.limits.max_file_bytes {
            debug!(path = entry.path, size = size, "Skipping content of large file");
            return Ok(SourceFile::without_content(entry.path, size));
        }

        let mut segments = vec!["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"];
        segments.extend(entry.path.split('/'));
        let url = self.api_url(&segments)?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, RAW_MEDIA_TYPE)
            .send()
            .await?;
        self.check_rate_limit(&response)?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!(path = entry.path, "File vanished while fetching, skipping content");
            return Ok(SourceFile::without_content(entry.path, size));
        }
        if !response.status().is_success() {
            return Err(CollectorError::Fetch(format!(
                "GitHub API error: {} fetching {}",
                response.status(),
                entry.path
            )));
        }

        let bytes = response.bytes().await?;
        match String::from_utf8(bytes.to_vec()) {
            Ok(content) => Ok(SourceFile {
                path: entry.path,
                size: size.max(content.len() as u64),
                content: Some(content),
            }),
            Err(_) => {
                debug!(path = entry.path, "Content is not valid UTF-8");
                Ok(SourceFile::without_content(entry.path, size))
            }
        }
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            CollectorError::Fetch(format!(
                "Invalid API base URL {}: {}",
                self.config.api_base_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                CollectorError::Fetch(format!(
                    "Invalid API base URL {}",
                    self.config.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn check_rate_limit(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();
        if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
            return Ok(());
        }

        let headers = response.headers();
        let exhausted = headers
            .get("x-ratelimit-remaining")
            .is_some_and(|remaining| remaining == "0");

        if !exhausted && status != StatusCode::TOO_MANY_REQUESTS {
            return Ok(());
        }

        let retry_after = headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let wait = retry_after.unwrap_or_else(|| {
            let reset = headers
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            match reset {
                Some(reset) => reset.saturating_sub(Utc::now().timestamp().max(0) as u64),
                None => 60,
            }
        });

        warn!(status = %status, wait = wait, "GitHub rate limit hit");
        Err(CollectorError::RateLimited(wait))
    }
}

#[async_trait]
impl RepoSource for GithubCollector {
    async fn fetch_repo_info(&self, repo: &RepoReference) -> Result<RepoInfo> {
        info!(repo = %repo, "Fetching repository metadata");
        let response = self.get_repo(repo).await?;
        Ok(response.into())
    }

    fn fetch_files<'a>(&'a self, repo: &'a RepoReference) -> BoxStream<'a, Result<SourceFile>> {
        let concurrency = self.config.limits.concurrency.max(1);

        async move {
            let entries = self.list_files(repo).await?;
            Ok::<_, CollectorError>(
                stream::iter(entries)
                    .map(move |entry| self.fetch_entry(repo, entry))
                    .buffered(concurrency),
            )
        }
        .try_flatten_stream()
        .boxed()
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| CollectorError::Fetch(format!("Invalid header value: {}", e)))
}

/// Apply the file selection policy to a tree listing, keeping tree order
fn select_entries(entries: Vec<TreeEntry>, limits: &FetchLimits) -> Vec<TreeEntry> {
    entries
        .into_iter()
        .filter(|e| e.kind == "blob")
        .filter(|e| !in_skipped_dir(&e.path))
        .filter(|e| !is_binary_path(&e.path))
        .take(limits.max_files)
        .collect()
}

fn in_skipped_dir(path: &str) -> bool {
    let mut dirs = path.split('/').collect::<Vec<_>>();
    dirs.pop();
    dirs.iter().any(|d| SKIPPED_DIRS.contains(d))
}

fn is_binary_path(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
    if name.ends_with(".min.js") || name.ends_with(".min.css") || name.ends_with(".map") {
        return true;
    }

    name.rsplit_once('.')
        .is_some_and(|(_, ext)| BINARY_EXTENSIONS.contains(&ext))
}
