//! `AnalysisStore` backed by SQLite

use crate::schema::Database;
use crate::DatabaseError;
use async_trait::async_trait;
use repovitals_analyzer::{
    AnalysisStore, AnalysisUpdate, CodeAnalysis, NewCodeAnalysis, StoreError,
};

impl From<DatabaseError> for StoreError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => StoreError::NotFound(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[async_trait]
impl AnalysisStore for Database {
    async fn insert(&self, new: NewCodeAnalysis) -> Result<CodeAnalysis, StoreError> {
        Ok(self.insert_analysis(new).await?)
    }

    async fn update(&self, id: &str, update: AnalysisUpdate) -> Result<CodeAnalysis, StoreError> {
        Ok(self.finish_analysis(id, update).await?)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        Ok(self.delete_analysis(id).await?)
    }

    async fn list_by_service(&self, service_id: &str) -> Result<Vec<CodeAnalysis>, StoreError> {
        Ok(self.get_analyses_by_service(service_id).await?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CodeAnalysis>, StoreError> {
        Ok(self.get_analysis(id).await?)
    }
}
