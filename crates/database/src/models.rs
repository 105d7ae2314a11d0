//! Database models for RepoVitals

use crate::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use repovitals_analyzer::{AnalysisStatus, AnalysisSummary, CodeAnalysis, Finding};

/// A `code_analyses` row as stored; findings and summary are JSON text
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRow {
    pub id: String,
    pub service_id: String,
    pub user_id: String,
    pub repo_url: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub status: String,
    pub findings: Option<String>,
    pub summary: Option<String>,
    pub error_message: Option<String>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for CodeAnalysis {
    type Error = DatabaseError;

    fn try_from(row: AnalysisRow) -> Result<Self> {
        let status: AnalysisStatus = row.status.parse().map_err(DatabaseError::InvalidData)?;

        let findings = row
            .findings
            .as_deref()
            .map(|json| serde_json::from_str::<Vec<Finding>>(json))
            .transpose()?;
        let summary = row
            .summary
            .as_deref()
            .map(|json| serde_json::from_str::<AnalysisSummary>(json))
            .transpose()?;

        if status == AnalysisStatus::Completed && (findings.is_none() || summary.is_none()) {
            return Err(DatabaseError::InvalidData(format!(
                "completed analysis {} has no results",
                row.id
            )));
        }

        Ok(CodeAnalysis {
            id: row.id,
            service_id: row.service_id,
            user_id: row.user_id,
            repo_url: row.repo_url,
            repo_owner: row.repo_owner,
            repo_name: row.repo_name,
            status,
            findings,
            summary,
            error_message: row.error_message,
            analyzed_at: row.analyzed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
