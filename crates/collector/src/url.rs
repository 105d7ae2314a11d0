//! GitHub repository URL parsing

use crate::{CollectorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const GITHUB_HOST: &str = "github.com";

/// Normalized `{owner, repo}` pair identifying a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoReference {
    pub owner: String,
    pub repo: String,
}

impl RepoReference {
    /// `owner/repo`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Canonical browser URL for the repository
    pub fn html_url(&self) -> String {
        format!("https://{}/{}/{}", GITHUB_HOST, self.owner, self.repo)
    }
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoReference {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        parse_repo_url(s)
    }
}

/// Extract `{owner, repo}` from a GitHub repository URL.
///
/// Accepts an optional `http(s)://` scheme, an optional `www.` prefix, a
/// trailing `.git`, a trailing slash, and extra path segments such as
/// `/tree/main`, which are ignored along with any query or fragment.
pub fn parse_repo_url(url: &str) -> Result<RepoReference> {
    let invalid = || CollectorError::InvalidUrl(url.to_string());

    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let without_scheme = strip_scheme(trimmed);
    let without_suffix = without_scheme
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');

    let mut segments = without_suffix.split('/');

    let host = segments.next().unwrap_or_default().to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host != GITHUB_HOST {
        return Err(invalid());
    }

    let owner = segments.next().unwrap_or_default();
    let repo = segments.next().unwrap_or_default();
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    if !is_valid_owner(owner) || !is_valid_repo(repo) {
        return Err(invalid());
    }

    Ok(RepoReference {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

fn strip_scheme(url: &str) -> &str {
    for scheme in ["https://", "http://"] {
        let matches = url
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme));
        if matches {
            return &url[scheme.len()..];
        }
    }
    url
}

fn is_valid_owner(owner: &str) -> bool {
    !owner.is_empty() && owner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_repo(repo: &str) -> bool {
    !repo.is_empty()
        && repo != "."
        && repo != ".."
        && repo
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
