//! Session gate and dashboard loading against the reference backend.

use marksync_client::{
    load_dashboard, Avatar, ClientConfig, ClientError, DashboardLoad, GateDecision,
    LandingDecision, LandingView, Route,
};
use marksync_testkit::prelude::*;
use url::Url;

#[tokio::test]
async fn signed_out_visitor_is_sent_to_landing() {
    let session = TestSession::signed_out();
    match session.load().await {
        DashboardLoad::Redirect(route) => assert_eq!(route, Route::landing()),
        DashboardLoad::Ready(_) => panic!("dashboard rendered without a session"),
    }
    // Nothing subscribed for a visitor who never got in.
    assert_eq!(session.backend.hub().subscriber_count(), 0);
}

#[tokio::test]
async fn session_error_lands_with_code() {
    let session = TestSession::signed_in();
    session.auth.fail_next_current_user("refresh token revoked");

    match session.load().await {
        DashboardLoad::Redirect(route) => assert_eq!(route.path(), "/?error=session_error"),
        DashboardLoad::Ready(_) => panic!("dashboard rendered despite a session error"),
    }
}

#[tokio::test]
async fn ready_dashboard_renders_snapshot_and_header() {
    let session = TestSession::signed_in();
    session.seed("https://www.rust-lang.org/learn", "");
    session.seed("https://docs.rs", "Docs");

    let dashboard = session.dashboard().await;
    assert_eq!(dashboard.user().id, session.owner());

    let header = dashboard.header();
    assert_eq!(header.display_name, "Ada Lovelace");
    assert_eq!(header.first_name, "Ada");
    assert_eq!(header.avatar, Avatar::Initial("A".into()));

    let list = dashboard.list();
    assert_eq!(list.heading, "Your Bookmarks");
    assert_eq!(list.summary, "2 bookmarks");
    assert_eq!(list.rows[0].title, "Docs");
    assert_eq!(list.rows[1].title, "www.rust-lang.org");
    assert_eq!(list.rows[1].domain, "rust-lang.org");
    assert!(!list.form.submit_disabled);
}

#[tokio::test]
async fn failed_snapshot_renders_empty_list() {
    let session = TestSession::signed_in();
    session.seed("https://a.example.com", "");
    session.backend.fail_next_fetch_all("connection reset by peer");

    let dashboard = session.dashboard().await;
    assert!(dashboard.list().is_empty());

    // The feed still works.
    let b = session.seed("https://b.example.com", "");
    wait_until(dashboard.controller(), |c| !c.bookmarks().is_empty()).await;
    assert_eq!(dashboard.controller().ids(), vec![b.id]);
}

#[tokio::test]
async fn subscribe_failure_surfaces_as_error() {
    let session = TestSession::signed_in();
    session.backend.hub().fail_next_subscribe("channel limit reached");

    let result = load_dashboard(
        &session.gate,
        session.store(),
        session.feed(),
        ClientConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(ClientError::Feed(_))));
    assert_eq!(session.backend.hub().subscriber_count(), 0);
}

#[tokio::test]
async fn landing_guard_and_sign_in() {
    let session = TestSession::signed_out();
    assert_eq!(session.gate.guard_landing().await, LandingDecision::Render);
    assert!(matches!(
        session.gate.guard_dashboard().await,
        GateDecision::Redirect(_)
    ));

    let route = session.gate.begin_sign_in("https://marks.example.com/").await;
    let Route::External(target) = route else {
        panic!("expected provider redirect");
    };
    let url = Url::parse(&target).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap()
    };
    assert_eq!(get("provider"), "google");
    assert_eq!(get("redirect_to"), "https://marks.example.com/auth/callback");
    assert_eq!(get("access_type"), "offline");
    assert_eq!(get("prompt"), "consent");
    session
        .auth
        .verify_state(&get("state"), "google", "https://marks.example.com/auth/callback")
        .unwrap();

    // Completing the callback establishes the session.
    session.auth.sign_in_as(session.user.clone());
    assert_eq!(
        session.gate.guard_landing().await,
        LandingDecision::Redirect(Route::Dashboard)
    );
}

#[tokio::test]
async fn sign_out_returns_to_landing() {
    let session = TestSession::signed_in();
    let dashboard = session.dashboard().await;

    let route = session.gate.sign_out().await;
    dashboard.controller().unmount();
    assert_eq!(route, Route::landing());
    assert_eq!(session.backend.hub().subscriber_count(), 0);

    match session.load().await {
        DashboardLoad::Redirect(route) => assert_eq!(route, Route::landing()),
        DashboardLoad::Ready(_) => panic!("dashboard rendered after sign out"),
    }
}

#[test]
fn landing_view_maps_error_codes() {
    let view = LandingView::new(&Route::landing_with_error("session_error"), "Google", "/auth");
    assert!(view.error.is_some());
    assert_eq!(view.sign_in_label, "Continue with Google");
}
