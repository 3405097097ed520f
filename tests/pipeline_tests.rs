//! Fetch-and-normalize pipeline end to end.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{MockBackend, Reply, client_for};
use orgdash::api::ApiClient;
use orgdash::pipeline::engagement::EngagementView;
use orgdash::pipeline::overview::OverviewView;
use orgdash::pipeline::population_health::PopulationHealthView;
use orgdash::pipeline::reports::ReportsView;
use orgdash::pipeline::{ErrorKind, ViewLoader, ViewState, fetch};
use orgdash::storage::{MemoryStore, TokenStore};
use serde_json::json;

#[test]
fn engagement_completion_rate_from_backend() {
    let backend = MockBackend::start(|req| match req.path() {
        "/api/org/analytics/engagement" => Reply::json(
            200,
            json!({
                "success": true,
                "data": {
                    "weekly_active_users": 80,
                    "monthly_active_users": 150,
                    "appointment_metrics": {"total_booked": 150, "completed": 45, "no_show_rate": 12.5},
                    "inactivity_flags": {"30_days": 15, "60_days": 9, "90_days": 3}
                }
            }),
        ),
        _ => Reply::not_found(),
    });
    let (_, client) = client_for(&backend.base_url());

    let model = fetch(&EngagementView, &client).unwrap();
    assert_eq!(model.appointments.completion_label(), "30.0%");
    assert_eq!(model.inactivity[0].count, 15);
    assert!((model.inactivity[0].share_pct - 10.0).abs() < 1e-9);
}

#[test]
fn unauthorized_view_is_auth_failure() {
    let backend = MockBackend::start(|_| {
        Reply::json(401, json!({"success": false, "message": "Unauthenticated."}))
    });
    let (_, client) = client_for(&backend.base_url());

    let mut loader = ViewLoader::new(OverviewView);
    loader.load(&client);

    let err = loader.error().expect("load should fail");
    assert_eq!(err.kind, ErrorKind::Auth);
    assert!(err.kind.needs_login());
    assert_eq!(err.message, "You need to login to view dashboard metrics");
}

#[test]
fn envelope_failure_surfaces_backend_message() {
    let backend = MockBackend::start(|_| {
        Reply::json(403, json!({"success": false, "message": "Organization suspended"}))
    });
    let (_, client) = client_for(&backend.base_url());

    let err = fetch(&PopulationHealthView, &client).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "Organization suspended");
}

#[test]
fn reload_discards_stale_model_on_failure() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let backend = MockBackend::start(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Reply::json(200, json!({"success": true, "data": {"total_employees": 250}}))
        } else {
            Reply::json(500, json!({"success": false, "message": "Server Error"}))
        }
    });
    let (_, client) = client_for(&backend.base_url());

    let mut loader = ViewLoader::new(OverviewView);
    loader.load(&client);
    assert_eq!(loader.model().map(|m| m.total_employees), Some(250));

    loader.load(&client);
    assert!(loader.model().is_none());
    assert_eq!(loader.error().map(|e| e.kind), Some(ErrorKind::Server));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn reload_replaces_model_with_fresh_values() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let backend = MockBackend::start(move |_| {
        let total = if counter.fetch_add(1, Ordering::SeqCst) == 0 { 250 } else { 260 };
        Reply::json(
            200,
            json!({"success": true, "data": {"total_employees": total, "active_users": 190}}),
        )
    });
    let (_, client) = client_for(&backend.base_url());

    let mut loader = ViewLoader::new(OverviewView);
    loader.load(&client);
    assert_eq!(loader.model().map(|m| m.total_employees), Some(250));

    loader.load(&client);
    let model = loader.model().expect("second load succeeded");
    assert_eq!(model.total_employees, 260);
    assert_eq!(model.active_users, 190);
    assert!(loader.error().is_none());
}

#[test]
fn string_and_float_counts_do_not_fail_the_view() {
    for total in [json!(250.0), json!("250")] {
        let body = json!({"success": true, "data": {"total_employees": total, "active_users": "not a number"}});
        let backend = MockBackend::start(move |_| Reply::json(200, body.clone()));
        let (_, client) = client_for(&backend.base_url());

        let model = fetch(&OverviewView, &client).unwrap();
        assert_eq!(model.total_employees, 250);
        assert_eq!(model.active_users, 0);
    }
}

#[test]
fn refused_connection_is_network_even_when_url_mentions_401() {
    let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
    let client = ApiClient::new(
        "http://127.0.0.1:4010/api/org",
        Some(Duration::from_millis(500)),
        tokens,
    );

    let err = fetch(&OverviewView, &client).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Network);
    assert_ne!(err.message, "You need to login to view dashboard metrics");
    assert_eq!(err.detail.matches("127.0.0.1:4010").count(), 1);
}

#[test]
fn unreachable_backend_is_network_failure() {
    let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
    let client = ApiClient::new(
        "http://127.0.0.1:9/api/org",
        Some(Duration::from_millis(500)),
        tokens,
    );

    let mut loader = ViewLoader::new(EngagementView);
    match loader.load(&client) {
        ViewState::Failed(err) => assert_eq!(err.kind, ErrorKind::Network),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn paged_view_requests_current_page() {
    let backend = MockBackend::start(|_| {
        Reply::json(
            200,
            json!({
                "success": true,
                "data": {
                    "data": [{"id": 1, "report_type": "engagement", "format": "CSV", "status": "FAILED"}],
                    "current_page": 2,
                    "last_page": 2
                }
            }),
        )
    });
    let (_, client) = client_for(&backend.base_url());

    let mut loader = ViewLoader::new(ReportsView::default());
    loader.view_mut().page = 2;
    loader.load(&client);

    assert_eq!(backend.last_request().url, "/api/org/reports?page=2");
    let page = loader.model().expect("reports loaded");
    assert_eq!(page.rows.len(), 1);
    assert!(!page.has_next());
    assert!(!page.rows[0].is_downloadable());
}

#[test]
fn success_without_data_is_failure() {
    let backend = MockBackend::start(|_| Reply::json(200, json!({"success": true})));
    let (_, client) = client_for(&backend.base_url());

    let err = fetch(&OverviewView, &client).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Server);
    assert_eq!(err.message, "response envelope carried no data");
}
