use showcase_core::filter::{CatalogFilter, VisibleSet};
use showcase_core::model::{Project, ProjectDraft, ProjectId, Session};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{info, warn};

use crate::catalog_service::CatalogService;
use crate::error::{ProjectServiceError, SessionManagerError};
use crate::project_service::ProjectService;
use crate::session_manager::{RestoreOutcome, SessionEvent, SessionManager};

/// What happened when the showcase mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountReport {
    pub session: RestoreOutcome,
    pub catalog_loaded: bool,
}

/// Side effects the presentation layer has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerSignal {
    /// Session was lost; application state was discarded and the catalog re-fetched.
    Reloaded,
}

/// Everything the index page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowcaseView<'a> {
    pub visible: VisibleSet<'a>,
    pub search_enabled: bool,
    pub create_enabled: bool,
    pub session: Option<Session>,
}

/// Thin wiring between UI events, the session manager and the catalog filter.
pub struct ShowcaseController {
    sessions: SessionManager,
    catalog: CatalogService,
    projects: ProjectService,
    filter: CatalogFilter,
    events: broadcast::Receiver<SessionEvent>,
}

impl ShowcaseController {
    #[must_use]
    pub fn new(sessions: SessionManager, catalog: CatalogService, projects: ProjectService) -> Self {
        let events = sessions.subscribe();
        Self {
            sessions,
            catalog,
            projects,
            filter: CatalogFilter::new(),
            events,
        }
    }

    /// Restore any persisted session, then fetch the catalog.
    pub async fn mount(&mut self) -> MountReport {
        let session = match self.sessions.restore().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "could not read persisted session; continuing logged out");
                RestoreOutcome::NoSession
            }
        };
        let catalog_loaded = self.load_catalog().await;
        MountReport {
            session,
            catalog_loaded,
        }
    }

    /// Stop background renewal. The persisted session survives for the next mount.
    pub async fn unmount(&self) {
        self.sessions.shutdown().await;
    }

    /// Fetch the catalog and hand it to the filter. On failure the view stays loading.
    pub async fn load_catalog(&mut self) -> bool {
        match self.catalog.load().await {
            Ok(projects) => {
                self.filter.set_catalog(projects);
                true
            }
            Err(_) => false,
        }
    }

    /// Discard all application state and fetch the catalog again.
    pub async fn reload(&mut self) -> bool {
        self.filter = CatalogFilter::new();
        self.load_catalog().await
    }

    pub fn search_input(&mut self, raw: &str) {
        self.filter.apply_text_query(raw);
    }

    pub fn select_category(&mut self, raw: &str) {
        self.filter.apply_category_constraint(raw);
    }

    /// # Errors
    ///
    /// Returns `SessionManagerError` if the session cannot be persisted.
    pub async fn login(&mut self, session: Session) -> Result<(), SessionManagerError> {
        self.sessions.login(session).await
    }

    /// # Errors
    ///
    /// Returns `SessionManagerError` if the persisted session cannot be erased.
    pub async fn logout(&mut self) -> Result<(), SessionManagerError> {
        self.sessions.logout().await
    }

    /// # Errors
    ///
    /// Returns `ProjectServiceError` if the project cannot be fetched.
    pub async fn project(&self, id: ProjectId) -> Result<Project, ProjectServiceError> {
        self.projects.fetch(id).await
    }

    /// Create a project, then refresh the catalog so it shows up.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if validation, authentication or the request fails.
    pub async fn create_project(
        &mut self,
        draft: ProjectDraft,
    ) -> Result<Project, ProjectServiceError> {
        let project = self.projects.create(draft).await?;
        self.load_catalog().await;
        Ok(project)
    }

    /// Update a project, then refresh the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if validation, authentication or the request fails.
    pub async fn update_project(
        &mut self,
        id: ProjectId,
        draft: ProjectDraft,
    ) -> Result<Project, ProjectServiceError> {
        let project = self.projects.update(id, draft).await?;
        self.load_catalog().await;
        Ok(project)
    }

    /// React to a session notification. A forced logout triggers a full reload.
    pub async fn handle_session_event(&mut self, event: &SessionEvent) -> Option<ControllerSignal> {
        match event {
            SessionEvent::ForcedLogout { reason } => {
                warn!(%reason, "session lost; reloading showcase");
                self.reload().await;
                Some(ControllerSignal::Reloaded)
            }
            SessionEvent::LoggedIn { user_id } | SessionEvent::Restored { user_id } => {
                info!(%user_id, "user signed in");
                None
            }
            SessionEvent::Renewed { .. } | SessionEvent::LoggedOut => None,
        }
    }

    /// Handle every session notification queued so far.
    pub async fn drain_session_events(&mut self) -> Vec<ControllerSignal> {
        let mut signals = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => signals.extend(self.handle_session_event(&event).await),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "session events dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        signals
    }

    /// Wait for the next session notification.
    pub async fn next_session_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.events.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "session events dropped"),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    #[must_use]
    pub fn view(&self) -> ShowcaseView<'_> {
        let session = self.sessions.current();
        let loaded = self.filter.is_loaded();
        ShowcaseView {
            visible: self.filter.visible(),
            search_enabled: loaded,
            create_enabled: loaded && session.is_some(),
            session,
        }
    }

    #[must_use]
    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}
