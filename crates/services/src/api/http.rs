use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use showcase_core::model::{AccessToken, Project, ProjectFields, ProjectId, RefreshToken};

use super::{CatalogSource, ProjectGateway, TokenRenewer};
use crate::config::ApiConfig;
use crate::error::{ApiError, RenewalError};

const PROJECTS_PATH: &str = "api/projects/";
const TOKEN_REFRESH_PATH: &str = "api/token/refresh/";

/// reqwest-backed client for the showcase API.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn project_path(id: ProjectId) -> String {
        format!("{PROJECTS_PATH}{id}/")
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(ApiError::HttpStatus(response.status()));
    }
    Ok(response.json().await?)
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

#[async_trait]
impl TokenRenewer for HttpApi {
    async fn renew(&self, refresh: &RefreshToken) -> Result<AccessToken, RenewalError> {
        let url = self.config.endpoint(TOKEN_REFRESH_PATH)?;
        let response = self
            .client
            .post(url)
            .json(&RefreshRequest {
                refresh: refresh.as_str(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RenewalError::Rejected(response.status()));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|_| RenewalError::MalformedResponse)?;
        let access = body.access.ok_or(RenewalError::MalformedResponse)?;
        AccessToken::new(access).map_err(|_| RenewalError::MalformedResponse)
    }
}

#[async_trait]
impl CatalogSource for HttpApi {
    async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
        let url = self.config.endpoint(PROJECTS_PATH)?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl ProjectGateway for HttpApi {
    async fn fetch_project(&self, id: ProjectId) -> Result<Project, ApiError> {
        let url = self.config.endpoint(&Self::project_path(id))?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn create_project(
        &self,
        access: &AccessToken,
        fields: &ProjectFields,
    ) -> Result<Project, ApiError> {
        let url = self.config.endpoint(PROJECTS_PATH)?;
        let response = self
            .client
            .post(url)
            .bearer_auth(access.as_str())
            .json(fields)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_project(
        &self,
        access: &AccessToken,
        id: ProjectId,
        fields: &ProjectFields,
    ) -> Result<Project, ApiError> {
        let url = self.config.endpoint(&Self::project_path(id))?;
        let response = self
            .client
            .put(url)
            .bearer_auth(access.as_str())
            .json(fields)
            .send()
            .await?;
        decode(response).await
    }
}
