use std::sync::Arc;

use showcase_core::model::{Project, ProjectDraft, ProjectId};
use tracing::info;

use crate::api::ProjectGateway;
use crate::error::ProjectServiceError;
use crate::session_manager::SessionManager;

/// Project detail reads and authenticated create/edit.
#[derive(Clone)]
pub struct ProjectService {
    gateway: Arc<dyn ProjectGateway>,
    sessions: SessionManager,
}

impl ProjectService {
    #[must_use]
    pub fn new(gateway: Arc<dyn ProjectGateway>, sessions: SessionManager) -> Self {
        Self { gateway, sessions }
    }

    /// # Errors
    ///
    /// Returns `ProjectServiceError::Api` if the project cannot be fetched.
    pub async fn fetch(&self, id: ProjectId) -> Result<Project, ProjectServiceError> {
        Ok(self.gateway.fetch_project(id).await?)
    }

    /// Validate the form input and create a project as the current user.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if the draft is invalid, nobody is logged in,
    /// or the API rejects the request.
    pub async fn create(&self, draft: ProjectDraft) -> Result<Project, ProjectServiceError> {
        let fields = draft.validate()?;
        let session = self
            .sessions
            .current()
            .ok_or(ProjectServiceError::NotLoggedIn)?;
        let project = self
            .gateway
            .create_project(session.access_token(), &fields)
            .await?;
        info!(project_id = %project.id(), "project created");
        Ok(project)
    }

    /// Validate the form input and replace an existing project's fields.
    ///
    /// # Errors
    ///
    /// Returns `ProjectServiceError` if the draft is invalid, nobody is logged in,
    /// or the API rejects the request.
    pub async fn update(
        &self,
        id: ProjectId,
        draft: ProjectDraft,
    ) -> Result<Project, ProjectServiceError> {
        let fields = draft.validate()?;
        let session = self
            .sessions
            .current()
            .ok_or(ProjectServiceError::NotLoggedIn)?;
        let project = self
            .gateway
            .update_project(session.access_token(), id, &fields)
            .await?;
        info!(project_id = %project.id(), "project updated");
        Ok(project)
    }
}
