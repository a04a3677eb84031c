use std::sync::Arc;

use showcase_core::model::Project;
use tracing::{error, info};

use crate::api::CatalogSource;
use crate::error::ApiError;

/// Fetches the project catalog once per (re)load.
#[derive(Clone)]
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
}

impl CatalogService {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Fetch the full catalog. No retry: a failure leaves the caller loading.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the catalog endpoint fails.
    pub async fn load(&self) -> Result<Vec<Project>, ApiError> {
        match self.source.fetch_projects().await {
            Ok(projects) => {
                info!(count = projects.len(), "catalog loaded");
                Ok(projects)
            }
            Err(err) => {
                error!(error = %err, "catalog fetch failed");
                Err(err)
            }
        }
    }
}
