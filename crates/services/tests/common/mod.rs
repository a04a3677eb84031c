#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use services::{
    ApiError, AppServices, CatalogSource, Clock, ProjectGateway, RenewalError, RenewalPolicy,
    TokenRenewer,
};
use showcase_core::model::{
    AccessToken, CategoryCode, Project, ProjectFields, ProjectId, RefreshToken, Session, UserId,
};
use showcase_core::time::fixed_clock;
use storage::repository::Storage;
use tokio::sync::Notify;

pub const INTERVAL: Duration = Duration::from_secs(60);

pub fn policy() -> RenewalPolicy {
    RenewalPolicy::new(INTERVAL, Some(Duration::from_secs(90)))
}

pub fn session(user: u64, refresh: &str) -> Session {
    Session::new(
        UserId::new(user),
        format!("user-{user}"),
        AccessToken::new(format!("initial-{user}")).unwrap(),
        RefreshToken::new(refresh).unwrap(),
    )
}

pub fn project(id: u64, name: &str, category: &str) -> Project {
    Project::new(
        ProjectId::new(id),
        name,
        format!("{name} blurb"),
        "",
        CategoryCode::parse(category).unwrap(),
        0,
        None,
    )
}

pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Answers renewals from a script, then with `access-N` forever.
#[derive(Default)]
pub struct ScriptedRenewer {
    calls: Mutex<Vec<String>>,
    script: Mutex<VecDeque<Result<String, StatusCode>>>,
}

impl ScriptedRenewer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(status: StatusCode) -> Arc<Self> {
        let renewer = Self::new();
        renewer.push(Err(status));
        renewer
    }

    pub fn push(&self, response: Result<String, StatusCode>) {
        self.script.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRenewer for ScriptedRenewer {
    async fn renew(&self, refresh: &RefreshToken) -> Result<AccessToken, RenewalError> {
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(refresh.as_str().to_owned());
            calls.len()
        };
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Ok(access)) => Ok(AccessToken::new(access).unwrap()),
            Some(Err(status)) => Err(RenewalError::Rejected(status)),
            None => Ok(AccessToken::new(format!("access-{call_number}")).unwrap()),
        }
    }
}

/// Blocks every renewal until released.
#[derive(Default)]
pub struct GatedRenewer {
    pub started: Notify,
    pub release: Notify,
    calls: Mutex<usize>,
}

impl GatedRenewer {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TokenRenewer for GatedRenewer {
    async fn renew(&self, _refresh: &RefreshToken) -> Result<AccessToken, RenewalError> {
        *self.calls.lock().unwrap() += 1;
        self.started.notify_one();
        self.release.notified().await;
        Ok(AccessToken::new("late-access").unwrap())
    }
}

/// Serves a fixed catalog, or fails with a status until `set_projects` is called.
#[derive(Default)]
pub struct FakeCatalog {
    projects: Mutex<Option<Vec<Project>>>,
    fetches: Mutex<usize>,
}

impl FakeCatalog {
    pub fn with(projects: Vec<Project>) -> Arc<Self> {
        let catalog = Self::default();
        *catalog.projects.lock().unwrap() = Some(projects);
        Arc::new(catalog)
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_projects(&self, projects: Vec<Project>) {
        *self.projects.lock().unwrap() = Some(projects);
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl CatalogSource for FakeCatalog {
    async fn fetch_projects(&self) -> Result<Vec<Project>, ApiError> {
        *self.fetches.lock().unwrap() += 1;
        self.projects
            .lock()
            .unwrap()
            .clone()
            .ok_or(ApiError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE))
    }
}

/// Accepts writes and remembers the access token they carried.
#[derive(Default)]
pub struct RecordingGateway {
    tokens: Mutex<Vec<String>>,
}

impl RecordingGateway {
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectGateway for RecordingGateway {
    async fn fetch_project(&self, id: ProjectId) -> Result<Project, ApiError> {
        Ok(project(id.value(), "Fetched", "X"))
    }

    async fn create_project(
        &self,
        access: &AccessToken,
        fields: &ProjectFields,
    ) -> Result<Project, ApiError> {
        self.tokens.lock().unwrap().push(access.as_str().to_owned());
        Ok(project(100, fields.name(), fields.category().as_str()))
    }

    async fn update_project(
        &self,
        access: &AccessToken,
        id: ProjectId,
        fields: &ProjectFields,
    ) -> Result<Project, ApiError> {
        self.tokens.lock().unwrap().push(access.as_str().to_owned());
        Ok(project(id.value(), fields.name(), fields.category().as_str()))
    }
}

pub struct Harness {
    pub storage: Storage,
    pub renewer: Arc<ScriptedRenewer>,
    pub catalog: Arc<FakeCatalog>,
    pub gateway: Arc<RecordingGateway>,
    pub services: AppServices,
}

pub fn harness(renewer: Arc<ScriptedRenewer>, catalog: Arc<FakeCatalog>) -> Harness {
    harness_with_clock(renewer, catalog, fixed_clock())
}

pub fn harness_with_clock(
    renewer: Arc<ScriptedRenewer>,
    catalog: Arc<FakeCatalog>,
    clock: Clock,
) -> Harness {
    let storage = Storage::in_memory();
    let gateway = Arc::new(RecordingGateway::default());
    let services = AppServices::with_backends(
        clock,
        policy(),
        Arc::clone(&storage.sessions),
        Arc::clone(&renewer) as Arc<dyn TokenRenewer>,
        Arc::clone(&catalog) as Arc<dyn CatalogSource>,
        Arc::clone(&gateway) as Arc<dyn ProjectGateway>,
    );
    Harness {
        storage,
        renewer,
        catalog,
        gateway,
        services,
    }
}
