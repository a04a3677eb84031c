//! Remote collaborators of the showcase: the catalog, project writes, and token renewal.

use async_trait::async_trait;
use showcase_core::model::{AccessToken, Project, ProjectFields, ProjectId, RefreshToken};

use crate::error::{ApiError, RenewalError};

mod http;

pub use http::HttpApi;

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRenewer: Send + Sync {
    /// # Errors
    ///
    /// Returns `RenewalError` on a non-success response or transport failure.
    async fn renew(&self, refresh: &RefreshToken) -> Result<AccessToken, RenewalError>;
}

/// Read-only source of the project catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every project in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body cannot be decoded.
    async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError>;
}

/// Single-project reads and authenticated writes.
#[async_trait]
pub trait ProjectGateway: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the project does not exist.
    async fn fetch_project(&self, id: ProjectId) -> Result<Project, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the request is rejected or fails.
    async fn create_project(
        &self,
        access: &AccessToken,
        fields: &ProjectFields,
    ) -> Result<Project, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the request is rejected or fails.
    async fn update_project(
        &self,
        access: &AccessToken,
        id: ProjectId,
        fields: &ProjectFields,
    ) -> Result<Project, ApiError>;
}
