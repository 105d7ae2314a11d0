//! Runs one analysis from URL to persisted record

use crate::finding::Finding;
use crate::rules::RuleRegistry;
use crate::store::{AnalysisStore, AnalysisUpdate, CodeAnalysis, NewCodeAnalysis, StoreError};
use crate::summary::{AnalysisSummary, Analyzer};
use chrono::Utc;
use futures::TryStreamExt;
use repovitals_collector::{parse_repo_url, CollectorError, RepoReference, RepoSource, SourceFile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

/// What a caller asks to have analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub repo_url: String,
    pub service_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Wall-clock limit for fetching and analysis
    pub time_budget: Option<Duration>,
}

/// Error raised while fetching or analyzing a repository
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Collector(#[from] CollectorError),

    #[error("Analysis exceeded the {}s time budget", .0.as_secs())]
    Timeout(Duration),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Collector(CollectorError::RepoNotFound(_)) => FailureKind::RepoNotFound,
            Self::Collector(CollectorError::RateLimited(_)) => FailureKind::RateLimited,
            Self::Collector(_) => FailureKind::Fetch,
            Self::Timeout(_) => FailureKind::Timeout,
        }
    }
}

/// Coarse reason a started analysis failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    RepoNotFound,
    RateLimited,
    Fetch,
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::RepoNotFound => "repo_not_found",
            Self::RateLimited => "rate_limited",
            Self::Fetch => "fetch",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid GitHub repository URL: {0}")]
    InvalidUrl(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Analysis {analysis_id} failed: {message}")]
    Failed {
        analysis_id: String,
        kind: FailureKind,
        message: String,
    },
}

/// Output of a pipeline run before persistence
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub findings: Vec<Finding>,
    pub summary: AnalysisSummary,
    pub files_analyzed: usize,
}

/// Fetch a repository, run every rule and summarize the findings
pub async fn run_pipeline(
    source: &dyn RepoSource,
    rules: &RuleRegistry,
    repo: &RepoReference,
) -> Result<AnalysisReport, PipelineError> {
    let started = Instant::now();

    let info = source.fetch_repo_info(repo).await?;
    let files: Vec<SourceFile> = source.fetch_files(repo).try_collect().await?;

    let findings = rules.run(&info, &files);
    let summary = Analyzer::summarize(&findings);

    info!(
        repo = %repo,
        files = files.len(),
        findings = summary.total_findings,
        health_score = summary.health_score,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Analyzed repository"
    );

    Ok(AnalysisReport {
        findings,
        summary,
        files_analyzed: files.len(),
    })
}

/// Sequences the pipeline and owns the record lifecycle
pub struct Orchestrator<'a> {
    source: &'a dyn RepoSource,
    store: &'a dyn AnalysisStore,
    rules: &'a RuleRegistry,
    config: PipelineConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        source: &'a dyn RepoSource,
        store: &'a dyn AnalysisStore,
        rules: &'a RuleRegistry,
    ) -> Self {
        Self {
            source,
            store,
            rules,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the URL and persist a `running` record
    pub async fn start(&self, request: AnalysisRequest) -> Result<CodeAnalysis, AnalysisError> {
        let repo = parse_repo_url(&request.repo_url)
            .map_err(|_| AnalysisError::InvalidUrl(request.repo_url.clone()))?;

        let record = self
            .store
            .insert(NewCodeAnalysis {
                service_id: request.service_id,
                user_id: request.user_id,
                repo_url: repo.html_url(),
                repo_owner: repo.owner,
                repo_name: repo.repo,
            })
            .await?;

        info!(analysis_id = %record.id, repo_url = %record.repo_url, "Started analysis");
        Ok(record)
    }

    /// Run the pipeline for a `running` record and persist its terminal state
    pub async fn execute(&self, record: CodeAnalysis) -> Result<CodeAnalysis, AnalysisError> {
        let repo = RepoReference {
            owner: record.repo_owner.clone(),
            repo: record.repo_name.clone(),
        };

        let outcome = match self.config.time_budget {
            Some(budget) => {
                match tokio::time::timeout(budget, run_pipeline(self.source, self.rules, &repo))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(PipelineError::Timeout(budget)),
                }
            }
            None => run_pipeline(self.source, self.rules, &repo).await,
        };

        match outcome {
            Ok(report) => {
                let updated = self
                    .store
                    .update(
                        &record.id,
                        AnalysisUpdate::Completed {
                            findings: report.findings,
                            summary: report.summary,
                            analyzed_at: Utc::now(),
                        },
                    )
                    .await?;
                info!(analysis_id = %updated.id, "Completed analysis");
                Ok(updated)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(analysis_id = %record.id, error = %message, "Analysis failed");

                self.store
                    .update(
                        &record.id,
                        AnalysisUpdate::Failed {
                            error_message: message.clone(),
                        },
                    )
                    .await?;

                Err(AnalysisError::Failed {
                    analysis_id: record.id,
                    kind: e.kind(),
                    message,
                })
            }
        }
    }

    /// Start and execute an analysis in one call
    pub async fn run_analysis(&self, request: AnalysisRequest) -> Result<CodeAnalysis, AnalysisError> {
        let record = self.start(request).await?;
        self.execute(record).await
    }
}
