//! RepoVitals Code Analyzer
//!
//! Runs heuristic rules over a fetched repository, aggregates the findings
//! into a health score and drives the persisted analysis lifecycle.

pub mod finding;
pub mod orchestrator;
pub mod rules;
pub mod store;
pub mod summary;

pub use finding::{Category, Finding, Severity};
pub use orchestrator::{
    run_pipeline, AnalysisError, AnalysisReport, AnalysisRequest, FailureKind, Orchestrator,
    PipelineConfig, PipelineError,
};
pub use rules::{Rule, RuleError, RuleRegistry};
pub use store::{
    AnalysisStatus, AnalysisStore, AnalysisUpdate, CodeAnalysis, NewCodeAnalysis, StoreError,
};
pub use summary::{AnalysisSummary, Analyzer};
