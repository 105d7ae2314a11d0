//! Fetched repository data and the source abstraction the analyzer consumes

use crate::{RepoReference, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Repository metadata, fetched once per analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: String,
    pub size_kb: u64,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    /// SPDX identifier of the detected license
    pub license: Option<String>,
    pub archived: bool,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// A file discovered in the repository tree.
///
/// `content` is `None` when the file was too large to fetch or was not valid
/// UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub size: u64,
    pub content: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            size: content.len() as u64,
            content: Some(content),
        }
    }

    /// A file listed in the tree whose content was not fetched
    pub fn without_content(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            content: None,
        }
    }

    /// Last path component
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Lowercased extension without the dot
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Directory part of the path, empty for root files
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    pub fn is_root(&self) -> bool {
        !self.path.contains('/')
    }

    pub fn line_count(&self) -> Option<usize> {
        self.content.as_deref().map(|c| c.lines().count())
    }
}

/// Where an analysis run gets its repository data from
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Fetch repository metadata
    async fn fetch_repo_info(&self, repo: &RepoReference) -> Result<RepoInfo>;

    /// Enumerate the repository's files as a single-pass stream
    fn fetch_files<'a>(&'a self, repo: &'a RepoReference) -> BoxStream<'a, Result<SourceFile>>;
}
