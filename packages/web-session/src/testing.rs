// Mock gateways for tests
//
// Responses are queued up front and consumed in order; every call is counted
// so tests can assert on network traffic.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use gallery_client::{ClientError, LoginRequest, Notification, Result};

use crate::auth::Identity;
use crate::gateway::{NotificationSource, SessionGateway};

// =============================================================================
// Mock Session Gateway
// =============================================================================

/// Session gateway that answers from queues.
///
/// An empty current-user queue answers `Unauthorized`, as does an empty login
/// queue.
#[derive(Default)]
pub struct MockGateway {
    current_user: Mutex<VecDeque<Result<Option<Identity>>>>,
    logins: Mutex<VecDeque<Result<Identity>>>,
    logout_fails: AtomicBool,
    delay: Option<Duration>,
    current_user_calls: AtomicUsize,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful current-user answer.
    pub fn with_user(self, identity: Identity) -> Self {
        self.current_user
            .lock()
            .unwrap()
            .push_back(Ok(Some(identity)));
        self
    }

    /// Queue a 2xx answer with no user in it.
    pub fn with_anonymous(self) -> Self {
        self.current_user.lock().unwrap().push_back(Ok(None));
        self
    }

    /// Queue a failed current-user lookup.
    pub fn with_failure(self, error: ClientError) -> Self {
        self.current_user.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a successful login.
    pub fn with_login(self, identity: Identity) -> Self {
        self.logins.lock().unwrap().push_back(Ok(identity));
        self
    }

    pub fn with_failing_logout(self) -> Self {
        self.logout_fails.store(true, Ordering::SeqCst);
        self
    }

    /// Hold every current-user lookup for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn current_user_calls(&self) -> usize {
        self.current_user_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.current_user_calls() + self.login_calls() + self.logout_calls()
    }
}

#[async_trait]
impl SessionGateway for MockGateway {
    async fn fetch_current_user(&self) -> Result<Option<Identity>> {
        self.current_user_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.current_user
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::Unauthorized))
    }

    async fn login(&self, _request: &LoginRequest) -> Result<Identity> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::Unauthorized))
    }

    async fn logout(&self) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.logout_fails.load(Ordering::SeqCst) {
            Err(ClientError::Network("connection reset".into()))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Mock Notification Source
// =============================================================================

/// Notification source that answers from a queue; an empty queue answers
/// with an empty list.
#[derive(Default)]
pub struct MockNotificationSource {
    responses: Mutex<VecDeque<Result<Vec<Notification>>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockNotificationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_list(self, list: Vec<Notification>) -> Self {
        self.responses.lock().unwrap().push_back(Ok(list));
        self
    }

    pub fn with_failure(self, error: ClientError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSource for MockNotificationSource {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// `count` unread notifications with ids `1..=count`.
pub fn sample_notifications(count: i64) -> Vec<Notification> {
    (1..=count)
        .map(|id| Notification::new(id).with_field("title", format!("Notification {}", id)))
        .collect()
}

// =============================================================================
// Combined mock API
// =============================================================================

/// Both mocks behind one value, for wiring an `AppContext`.
#[derive(Default)]
pub struct MockApi {
    pub session: MockGateway,
    pub notifications: MockNotificationSource,
}

impl MockApi {
    pub fn new(session: MockGateway, notifications: MockNotificationSource) -> Self {
        Self {
            session,
            notifications,
        }
    }
}

#[async_trait]
impl SessionGateway for MockApi {
    async fn fetch_current_user(&self) -> Result<Option<Identity>> {
        self.session.fetch_current_user().await
    }

    async fn login(&self, request: &LoginRequest) -> Result<Identity> {
        self.session.login(request).await
    }

    async fn logout(&self) -> Result<()> {
        self.session.logout().await
    }
}

#[async_trait]
impl NotificationSource for MockApi {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.notifications.fetch_notifications().await
    }
}
