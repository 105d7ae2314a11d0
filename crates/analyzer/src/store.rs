//! Persisted analysis records and the storage seam

use crate::finding::Finding;
use crate::summary::AnalysisSummary;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle of an analysis record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Running,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown analysis status: {}", other)),
        }
    }
}

/// One persisted analysis of one repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub id: String,
    pub service_id: String,
    pub user_id: String,
    pub repo_url: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub status: AnalysisStatus,
    pub findings: Option<Vec<Finding>>,
    pub summary: Option<AnalysisSummary>,
    pub error_message: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CodeAnalysis {
    /// Apply a terminal update to a running record
    pub fn apply(&mut self, update: AnalysisUpdate, now: DateTime<Utc>) {
        match update {
            AnalysisUpdate::Completed {
                findings,
                summary,
                analyzed_at,
            } => {
                self.status = AnalysisStatus::Completed;
                self.findings = Some(findings);
                self.summary = Some(summary);
                self.analyzed_at = Some(analyzed_at);
                self.error_message = None;
            }
            AnalysisUpdate::Failed { error_message } => {
                self.status = AnalysisStatus::Failed;
                self.findings = None;
                self.summary = None;
                self.analyzed_at = None;
                self.error_message = Some(error_message);
            }
        }
        self.updated_at = now;
    }
}

/// Fields supplied when an analysis starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCodeAnalysis {
    pub service_id: String,
    pub user_id: String,
    pub repo_url: String,
    pub repo_owner: String,
    pub repo_name: String,
}

/// Terminal transition of a running record
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisUpdate {
    Completed {
        findings: Vec<Finding>,
        summary: AnalysisSummary,
        analyzed_at: DateTime<Utc>,
    },
    Failed {
        error_message: String,
    },
}

impl AnalysisUpdate {
    pub fn status(&self) -> AnalysisStatus {
        match self {
            Self::Completed { .. } => AnalysisStatus::Completed,
            Self::Failed { .. } => AnalysisStatus::Failed,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Analysis not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Persistence collaborator for analysis records
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Create a `running` record and return it
    async fn insert(&self, new: NewCodeAnalysis) -> Result<CodeAnalysis, StoreError>;

    /// Move a `running` record to its terminal state
    async fn update(&self, id: &str, update: AnalysisUpdate) -> Result<CodeAnalysis, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Records of one service, newest first
    async fn list_by_service(&self, service_id: &str) -> Result<Vec<CodeAnalysis>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<CodeAnalysis>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Category, Severity};
    use crate::summary::Analyzer;

    fn running() -> CodeAnalysis {
        let now = Utc::now();
        CodeAnalysis {
            id: "a1".to_string(),
            service_id: "svc".to_string(),
            user_id: "u1".to_string(),
            repo_url: "https://github.com/o/r".to_string(),
            repo_owner: "o".to_string(),
            repo_name: "r".to_string(),
            status: AnalysisStatus::Running,
            findings: None,
            summary: None,
            error_message: None,
            analyzed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AnalysisStatus::Running,
            AnalysisStatus::Completed,
            AnalysisStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<AnalysisStatus>(), Ok(status));
        }
        assert!("done".parse::<AnalysisStatus>().is_err());
        assert!(!AnalysisStatus::Running.is_terminal());
        assert!(AnalysisStatus::Failed.is_terminal());
    }

    #[test]
    fn completed_update_sets_payload_only() {
        let findings = vec![Finding::new("r", Category::Testing, Severity::Warning, "t")];
        let summary = Analyzer::summarize(&findings);
        let mut record = running();

        record.apply(
            AnalysisUpdate::Completed {
                findings: findings.clone(),
                summary: summary.clone(),
                analyzed_at: Utc::now(),
            },
            Utc::now(),
        );

        assert_eq!(record.status, AnalysisStatus::Completed);
        assert_eq!(record.findings, Some(findings));
        assert_eq!(record.summary, Some(summary));
        assert!(record.analyzed_at.is_some());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn failed_update_sets_message_only() {
        let mut record = running();
        record.apply(
            AnalysisUpdate::Failed {
                error_message: "boom".to_string(),
            },
            Utc::now(),
        );

        assert_eq!(record.status, AnalysisStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("boom"));
        assert!(record.findings.is_none());
        assert!(record.summary.is_none());
        assert!(record.analyzed_at.is_none());
    }
}
