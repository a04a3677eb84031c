use std::sync::Arc;

use storage::repository::{SessionRepository, Storage};

use crate::api::{CatalogSource, HttpApi, ProjectGateway, TokenRenewer};
use crate::catalog_service::CatalogService;
use crate::config::ShowcaseConfig;
use crate::controller::ShowcaseController;
use crate::error::AppServicesError;
use crate::project_service::ProjectService;
use crate::session_manager::{RenewalPolicy, SessionManager};
use crate::Clock;

/// Assembles the showcase services from storage and remote backends.
#[derive(Clone)]
pub struct AppServices {
    sessions: SessionManager,
    catalog: CatalogService,
    projects: ProjectService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage or the HTTP client cannot be initialized.
    pub async fn from_config(
        config: &ShowcaseConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        let api = Arc::new(HttpApi::new(config.api.clone())?);
        Ok(Self::with_backends(
            clock,
            config.renewal,
            Arc::clone(&storage.sessions),
            Arc::clone(&api) as Arc<dyn TokenRenewer>,
            Arc::clone(&api) as Arc<dyn CatalogSource>,
            api as Arc<dyn ProjectGateway>,
        ))
    }

    #[must_use]
    pub fn with_backends(
        clock: Clock,
        policy: RenewalPolicy,
        session_repo: Arc<dyn SessionRepository>,
        renewer: Arc<dyn TokenRenewer>,
        source: Arc<dyn CatalogSource>,
        gateway: Arc<dyn ProjectGateway>,
    ) -> Self {
        let sessions = SessionManager::new(clock, policy, session_repo, renewer);
        let catalog = CatalogService::new(source);
        let projects = ProjectService::new(gateway, sessions.clone());
        Self {
            sessions,
            catalog,
            projects,
        }
    }

    #[must_use]
    pub fn sessions(&self) -> SessionManager {
        self.sessions.clone()
    }

    #[must_use]
    pub fn catalog(&self) -> CatalogService {
        self.catalog.clone()
    }

    #[must_use]
    pub fn projects(&self) -> ProjectService {
        self.projects.clone()
    }

    /// A controller wired to these services.
    #[must_use]
    pub fn controller(&self) -> ShowcaseController {
        ShowcaseController::new(
            self.sessions.clone(),
            self.catalog.clone(),
            self.projects.clone(),
        )
    }
}
