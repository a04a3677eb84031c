#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod catalog_service;
pub mod config;
pub mod controller;
pub mod error;
pub mod project_service;
pub mod renewal;
pub mod session_manager;

pub use showcase_core::Clock;

pub use api::{CatalogSource, HttpApi, ProjectGateway, TokenRenewer};
pub use app_services::AppServices;
pub use catalog_service::CatalogService;
pub use config::{ApiConfig, ShowcaseConfig};
pub use controller::{ControllerSignal, MountReport, ShowcaseController, ShowcaseView};
pub use error::{
    ApiError, AppServicesError, ConfigError, ProjectServiceError, RenewalError,
    SessionManagerError,
};
pub use project_service::ProjectService;
pub use renewal::RenewalTask;
pub use session_manager::{
    RenewOutcome, RenewalPolicy, RestoreOutcome, SessionEvent, SessionManager, SessionSnapshot,
};
