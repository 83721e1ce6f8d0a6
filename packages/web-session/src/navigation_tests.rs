//! End-to-end navigation scenarios through a wired AppContext.

use std::sync::Arc;
use std::time::Duration;

use gallery_client::ClientError;

use crate::testing::{sample_notifications, MockApi, MockGateway, MockNotificationSource};
use crate::{AppContext, Config, HistoryNavigator, Identity, Navigation, Route};

struct Harness {
    app: AppContext,
    api: Arc<MockApi>,
    navigator: Arc<HistoryNavigator>,
}

fn harness(session: MockGateway) -> Harness {
    harness_with(session, MockNotificationSource::new(), Config::default())
}

fn harness_with(
    session: MockGateway,
    notifications: MockNotificationSource,
    config: Config,
) -> Harness {
    let api = Arc::new(MockApi::new(session, notifications));
    let navigator = Arc::new(HistoryNavigator::new());
    let app = AppContext::new(&config, api.clone(), navigator.clone());
    Harness {
        app,
        api,
        navigator,
    }
}

fn alice() -> Identity {
    Identity::new("u1", "alice", "alice@example.com")
}

#[tokio::test]
async fn anonymous_visitor_is_sent_to_login() {
    let h = harness(MockGateway::new().with_failure(ClientError::Unauthorized));

    let outcome = h.app.guard.before_each(Route::Dashboard).await;

    assert_eq!(outcome, Navigation::Redirect(Route::Login));
    assert!(h.app.session.session_checked());
    assert!(!h.app.session.is_authenticated());
    assert_eq!(h.api.session.current_user_calls(), 1);
}

#[tokio::test]
async fn restored_user_reaches_dashboard() {
    let h = harness(MockGateway::new().with_user(alice()));

    assert_eq!(
        h.app.guard.before_each(Route::UserAccount).await,
        Navigation::Proceed
    );
    assert_eq!(h.app.session.user_id().as_deref(), Some("u1"));
}

#[tokio::test]
async fn signed_in_user_on_guest_route_goes_home_without_network() {
    let h = harness(MockGateway::new());
    h.app.session.set_user(alice());

    let outcome = h.app.guard.before_each(Route::Login).await;

    assert_eq!(outcome, Navigation::Redirect(Route::Dashboard));
    assert_eq!(h.api.session.total_calls(), 0);
}

#[tokio::test]
async fn checked_anonymous_session_is_not_rechecked() {
    let h = harness(MockGateway::new());

    for route in [Route::Home, Route::Dashboard, Route::Signup, Route::SettingsBilling] {
        h.app.guard.before_each(route).await;
    }
    h.app.guard.before_each_path("/about").await;

    assert_eq!(h.api.session.current_user_calls(), 1);
}

#[tokio::test]
async fn logout_forces_a_fresh_check() {
    let h = harness(
        MockGateway::new()
            .with_user(alice())
            .with_failure(ClientError::Unauthorized),
    );

    assert_eq!(h.app.guard.before_each(Route::Dashboard).await, Navigation::Proceed);
    h.app.session.logout().await;
    assert_eq!(h.navigator.current(), Some(Route::Home));

    let outcome = h.app.guard.before_each(Route::Dashboard).await;
    assert_eq!(outcome, Navigation::Redirect(Route::Login));
    assert_eq!(h.api.session.current_user_calls(), 2);
}

#[tokio::test]
async fn failed_logout_still_clears_and_lands_home() {
    let h = harness(MockGateway::new().with_failing_logout());
    h.app.session.set_user(alice());

    h.app.session.logout().await;

    assert!(!h.app.session.is_authenticated());
    assert!(!h.app.session.session_checked());
    assert_eq!(h.navigator.history(), vec![Route::Home]);
    assert_eq!(h.api.session.logout_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn racing_navigations_restore_once() {
    let h = harness(
        MockGateway::new()
            .with_user(alice())
            .with_delay(Duration::from_millis(250)),
    );

    let (a, b) = tokio::join!(
        h.app.guard.before_each(Route::Resource),
        h.app.guard.before_each(Route::Login)
    );

    assert_eq!(a, Navigation::Proceed);
    assert_eq!(b, Navigation::Redirect(Route::Dashboard));
    assert_eq!(h.api.session.current_user_calls(), 1);
}

#[tokio::test]
async fn unknown_path_is_allowed_for_everyone() {
    let h = harness(MockGateway::new());

    assert_eq!(h.app.guard.before_each_path("/pricing").await, Navigation::Proceed);
    assert_eq!(
        h.app.guard.before_each_path("/dashboard/settings/general?tab=1").await,
        Navigation::Redirect(Route::Login)
    );
}

#[tokio::test]
async fn mock_login_config_skips_restoration() {
    let config = Config {
        mock_logged_in: true,
        ..Config::default()
    };
    let h = harness_with(MockGateway::new(), MockNotificationSource::new(), config);

    assert_eq!(h.app.guard.before_each(Route::Dashboard).await, Navigation::Proceed);
    assert_eq!(h.app.session.user_name().as_deref(), Some("Dev User"));
    assert_eq!(h.api.session.total_calls(), 0);
}

#[tokio::test]
async fn session_and_notifications_are_independent() {
    let h = harness_with(
        MockGateway::new().with_failure(ClientError::Network("down".into())),
        MockNotificationSource::new().with_list(sample_notifications(2)),
        Config::default(),
    );

    let (navigation, list) = tokio::join!(
        h.app.guard.before_each(Route::UserNotifications),
        h.app.notifications.fetch_notifications(false)
    );

    assert_eq!(navigation, Navigation::Redirect(Route::Login));
    assert_eq!(list.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_can_be_shown_as_toast() {
    let h = harness_with(
        MockGateway::new(),
        MockNotificationSource::new().with_failure(ClientError::Network("timed out".into())),
        Config {
            toast_duration: Duration::from_millis(1000),
            ..Config::default()
        },
    );

    if let Err(e) = h.app.notifications.fetch_notifications(false).await {
        h.app.toast.show_notification(e.to_string());
    }
    assert!(h.app.toast.visible());
    assert!(h.app.toast.message().contains("timed out"));

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(!h.app.toast.visible());
}
