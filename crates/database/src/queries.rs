//! Database query functions

use crate::models::AnalysisRow;
use crate::schema::Database;
use crate::{DatabaseError, Result};
use chrono::Utc;
use repovitals_analyzer::{AnalysisStatus, AnalysisUpdate, CodeAnalysis, NewCodeAnalysis};
use uuid::Uuid;

const ANALYSIS_COLUMNS: &str = "id, service_id, user_id, repo_url, repo_owner, repo_name, status,
     findings, summary, error_message, analyzed_at, created_at, updated_at";

impl Database {
    /// Insert a new `running` analysis
    pub async fn insert_analysis(&self, new: NewCodeAnalysis) -> Result<CodeAnalysis> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO code_analyses
             (id, service_id, user_id, repo_url, repo_owner, repo_name, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.service_id)
        .bind(&new.user_id)
        .bind(&new.repo_url)
        .bind(&new.repo_owner)
        .bind(&new.repo_name)
        .bind(AnalysisStatus::Running.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_analysis(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Analysis: {}", id)))
    }

    /// Move a `running` analysis to its terminal state
    pub async fn finish_analysis(&self, id: &str, update: AnalysisUpdate) -> Result<CodeAnalysis> {
        let status = update.status();
        let now = Utc::now();

        let query = match update {
            AnalysisUpdate::Completed {
                findings,
                summary,
                analyzed_at,
            } => sqlx::query(
                "UPDATE code_analyses
                 SET status = ?, findings = ?, summary = ?, analyzed_at = ?,
                     error_message = NULL, updated_at = ?
                 WHERE id = ? AND status = 'running'",
            )
            .bind(status.as_str())
            .bind(serde_json::to_string(&findings)?)
            .bind(serde_json::to_string(&summary)?)
            .bind(analyzed_at),
            AnalysisUpdate::Failed { error_message } => sqlx::query(
                "UPDATE code_analyses
                 SET status = ?, error_message = ?, findings = NULL, summary = NULL,
                     analyzed_at = NULL, updated_at = ?
                 WHERE id = ? AND status = 'running'",
            )
            .bind(status.as_str())
            .bind(error_message),
        };

        let result = query.bind(now).bind(id).execute(self.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Running analysis: {}", id)));
        }

        self.get_analysis(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Analysis: {}", id)))
    }

    /// Delete an analysis by ID
    pub async fn delete_analysis(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM code_analyses WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Analysis: {}", id)));
        }
        Ok(())
    }

    /// Get all analyses of a service, newest first
    pub async fn get_analyses_by_service(&self, service_id: &str) -> Result<Vec<CodeAnalysis>> {
        let rows = sqlx::query_as::<_, AnalysisRow>(&format!(
            "SELECT {} FROM code_analyses
             WHERE service_id = ?
             ORDER BY created_at DESC, rowid DESC",
            ANALYSIS_COLUMNS
        ))
        .bind(service_id)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(CodeAnalysis::try_from).collect()
    }

    /// Get an analysis by ID
    pub async fn get_analysis(&self, id: &str) -> Result<Option<CodeAnalysis>> {
        let row = sqlx::query_as::<_, AnalysisRow>(&format!(
            "SELECT {} FROM code_analyses WHERE id = ?",
            ANALYSIS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(CodeAnalysis::try_from).transpose()
    }
}
