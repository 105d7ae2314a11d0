//! RepoVitals Web API
//!
//! Axum-based REST API for triggering and browsing code analyses.

mod error;
mod handlers;
mod identity;
mod routes;

pub use error::ApiError;
pub use identity::{CallerIdentity, USER_ID_HEADER};
pub use routes::create_router;

use repovitals_analyzer::{PipelineConfig, RuleRegistry};
use repovitals_collector::RepoSource;
use repovitals_database::Database;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub source: Arc<dyn RepoSource>,
    pub rules: Arc<RuleRegistry>,
    pub pipeline: PipelineConfig,
}

impl AppState {
    pub fn new(db: Database, source: Arc<dyn RepoSource>) -> Self {
        Self {
            db,
            source,
            rules: Arc::new(RuleRegistry::default()),
            pipeline: PipelineConfig::default(),
        }
    }

    pub fn with_rules(mut self, rules: RuleRegistry) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }
}

pub type SharedState = Arc<AppState>;
