use chrono::Utc;
use repovitals_analyzer::{
    AnalysisStatus, AnalysisStore, AnalysisUpdate, Analyzer, Category, Finding, NewCodeAnalysis,
    Severity, StoreError,
};
use repovitals_database::Database;

fn new_analysis(service_id: &str, repo: &str) -> NewCodeAnalysis {
    NewCodeAnalysis {
        service_id: service_id.to_string(),
        user_id: "user-1".to_string(),
        repo_url: format!("https://github.com/acme/{}", repo),
        repo_owner: "acme".to_string(),
        repo_name: repo.to_string(),
    }
}

fn sample_findings() -> Vec<Finding> {
    vec![
        Finding::new("missing-tests", Category::Testing, Severity::Warning, "No automated tests found"),
        Finding::new("hardcoded-secrets", Category::Security, Severity::Critical, "Possible AWS access key ID committed")
            .with_description("Line 3 of deploy.sh looks like a AWS access key ID.")
            .at("deploy.sh"),
    ]
}

#[tokio::test]
async fn insert_creates_running_record() {
    let db = Database::in_memory().await.unwrap();

    let record = db.insert(new_analysis("svc", "engine")).await.unwrap();

    assert_eq!(record.status, AnalysisStatus::Running);
    assert_eq!(record.id.len(), 36);
    assert_eq!(record.repo_name, "engine");
    assert!(record.findings.is_none());
    assert!(record.summary.is_none());
    assert!(record.error_message.is_none());
    assert!(record.analyzed_at.is_none());
}

#[tokio::test]
async fn completed_update_round_trips_results() {
    let db = Database::in_memory().await.unwrap();
    let record = db.insert(new_analysis("svc", "engine")).await.unwrap();

    let findings = sample_findings();
    let summary = Analyzer::summarize(&findings);
    let updated = db
        .update(
            &record.id,
            AnalysisUpdate::Completed {
                findings: findings.clone(),
                summary: summary.clone(),
                analyzed_at: Utc::now(),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, AnalysisStatus::Completed);
    assert_eq!(updated.findings.as_ref(), Some(&findings));
    assert_eq!(updated.summary.as_ref(), Some(&summary));
    assert!(updated.analyzed_at.is_some());

    let loaded = db.get_by_id(&record.id).await.unwrap().unwrap();
    assert_eq!(loaded.findings, Some(findings));
    assert_eq!(loaded.summary.unwrap().health_score, 80);
}

#[tokio::test]
async fn terminal_records_cannot_be_updated_again() {
    let db = Database::in_memory().await.unwrap();
    let record = db.insert(new_analysis("svc", "engine")).await.unwrap();

    let failed = db
        .update(
            &record.id,
            AnalysisUpdate::Failed {
                error_message: "Repository not found: acme/engine".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(failed.status, AnalysisStatus::Failed);
    assert_eq!(
        failed.error_message.as_deref(),
        Some("Repository not found: acme/engine")
    );

    let again = db
        .update(
            &record.id,
            AnalysisUpdate::Failed {
                error_message: "again".to_string(),
            },
        )
        .await;
    assert!(matches!(again, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn list_by_service_is_newest_first() {
    let db = Database::in_memory().await.unwrap();
    let first = db.insert(new_analysis("svc-a", "one")).await.unwrap();
    let second = db.insert(new_analysis("svc-a", "two")).await.unwrap();
    db.insert(new_analysis("svc-b", "other")).await.unwrap();

    let listed = db.list_by_service("svc-a").await.unwrap();
    let ids: Vec<_> = listed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

    assert!(db.list_by_service("svc-missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_record() {
    let db = Database::in_memory().await.unwrap();
    let record = db.insert(new_analysis("svc", "engine")).await.unwrap();

    db.delete(&record.id).await.unwrap();
    assert!(db.get_by_id(&record.id).await.unwrap().is_none());

    let missing = db.delete(&record.id).await;
    assert!(matches!(missing, Err(StoreError::NotFound(_))));
}
