mod common;

use common::{FakeCatalog, INTERVAL, ScriptedRenewer, harness, project, session, settle};
use reqwest::StatusCode;
use services::{ControllerSignal, ProjectServiceError, RestoreOutcome};
use showcase_core::model::{ProjectDraft, ProjectId};
use tokio::time;

fn catalog() -> Vec<showcase_core::model::Project> {
    vec![project(1, "Alpha", "X"), project(2, "Beta", "Y")]
}

fn draft(name: &str) -> ProjectDraft {
    ProjectDraft {
        name: name.into(),
        blurb: "something new".into(),
        category: "X".into(),
        ..ProjectDraft::default()
    }
}

#[tokio::test(start_paused = true)]
async fn mount_without_a_session_shows_the_full_catalog() {
    let h = harness(ScriptedRenewer::new(), FakeCatalog::with(catalog()));
    let mut controller = h.services.controller();

    let report = controller.mount().await;

    assert_eq!(report.session, RestoreOutcome::NoSession);
    assert!(report.catalog_loaded);
    let view = controller.view();
    assert_eq!(view.visible.ids(), vec![ProjectId::new(1), ProjectId::new(2)]);
    assert!(view.search_enabled);
    assert!(!view.create_enabled);
    assert!(view.session.is_none());
}

#[tokio::test(start_paused = true)]
async fn search_and_category_narrow_the_visible_set() {
    let h = harness(ScriptedRenewer::new(), FakeCatalog::with(catalog()));
    let mut controller = h.services.controller();
    controller.mount().await;

    controller.search_input("alp");
    assert_eq!(controller.view().visible.ids(), vec![ProjectId::new(1)]);

    controller.select_category("Y");
    controller.search_input("");
    assert_eq!(controller.view().visible.ids(), vec![ProjectId::new(2)]);

    controller.select_category("all");
    assert_eq!(controller.view().visible.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_the_view_loading_until_a_reload_succeeds() {
    let h = harness(ScriptedRenewer::new(), FakeCatalog::unavailable());
    let mut controller = h.services.controller();

    let report = controller.mount().await;
    assert!(!report.catalog_loaded);

    controller.search_input("alp");
    let view = controller.view();
    assert!(view.visible.is_loading());
    assert!(!view.search_enabled);

    h.catalog.set_projects(catalog());
    assert!(controller.load_catalog().await);
    assert_eq!(controller.view().visible.ids(), vec![ProjectId::new(1)]);
}

#[tokio::test(start_paused = true)]
async fn forced_logout_reloads_the_showcase() {
    let h = harness(
        ScriptedRenewer::failing(StatusCode::UNAUTHORIZED),
        FakeCatalog::with(catalog()),
    );
    let mut controller = h.services.controller();
    controller.mount().await;
    controller.login(session(1, "r1")).await.unwrap();
    controller.search_input("beta");
    assert!(controller.view().create_enabled);

    time::advance(INTERVAL).await;
    settle().await;

    assert_eq!(
        controller.drain_session_events().await,
        vec![ControllerSignal::Reloaded]
    );
    assert_eq!(h.catalog.fetches(), 2);
    assert!(!controller.filter().state().is_active());
    let view = controller.view();
    assert_eq!(view.visible.len(), 2);
    assert!(!view.create_enabled);
    assert!(view.session.is_none());
}

#[tokio::test(start_paused = true)]
async fn restored_session_is_reported_on_mount() {
    let h = harness(ScriptedRenewer::new(), FakeCatalog::with(catalog()));
    h.storage.sessions.save_session(&session(3, "r3")).await.unwrap();
    let mut controller = h.services.controller();

    let report = controller.mount().await;

    assert!(matches!(report.session, RestoreOutcome::Restored(_)));
    assert!(controller.view().create_enabled);
    controller.unmount().await;
    assert!(h.storage.sessions.load_session().await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn creating_requires_a_session_and_refreshes_the_catalog() {
    let h = harness(ScriptedRenewer::new(), FakeCatalog::with(catalog()));
    let mut controller = h.services.controller();
    controller.mount().await;

    let err = controller.create_project(draft("Gamma")).await.unwrap_err();
    assert!(matches!(err, ProjectServiceError::NotLoggedIn));

    controller.login(session(1, "r1")).await.unwrap();
    let created = controller.create_project(draft("Gamma")).await.unwrap();
    assert_eq!(created.name(), "Gamma");
    assert_eq!(h.gateway.tokens(), vec!["initial-1"]);
    assert_eq!(h.catalog.fetches(), 2);

    let invalid = controller.create_project(draft("   ")).await.unwrap_err();
    assert!(matches!(invalid, ProjectServiceError::Project(_)));

    controller.logout().await.unwrap();
    assert!(!controller.view().create_enabled);
}
