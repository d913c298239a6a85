//! API shared state

use std::sync::Arc;

use mindmesh_core::{NoteService, ServiceResult};

use super::error::ApiError;

/// Shared application state for the API
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NoteService>,
}

impl AppState {
    pub fn new(service: Arc<NoteService>) -> Self {
        Self { service }
    }

    /// Run a service call on the blocking pool
    pub async fn run<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&NoteService) -> ServiceResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let result = tokio::task::spawn_blocking(move || f(&service))
            .await
            .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?;
        result.map_err(ApiError::from)
    }
}
