//! Session store and the session-restoration protocol

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{BoxFuture, FutureExt, Shared};
use gallery_client::LoginRequest;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::session::{Identity, Session};
use crate::gateway::{Result, SessionGateway};
use crate::navigator::Navigator;
use crate::routes::Route;

type PendingRestore = Shared<BoxFuture<'static, ()>>;

/// Single authoritative record of who is logged in.
///
/// Cheap to clone; every clone shares the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<Session>,
    gateway: Arc<dyn SessionGateway>,
    navigator: Arc<dyn Navigator>,
    /// Bumped by logout and set_user; a restoration that started under an
    /// older generation must not write its result.
    generation: AtomicU64,
    /// The in-flight restoration, tagged with the generation it started in.
    /// The future holds only a `Weak` back to this struct, and the lock is
    /// never held across an await.
    pending: Mutex<Option<(u64, PendingRestore)>>,
}

impl SessionStore {
    /// An empty, unchecked store.
    pub fn new(gateway: Arc<dyn SessionGateway>, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_session(gateway, navigator, Session::default())
    }

    /// A store that starts signed in as `identity` without asking the server.
    pub fn preseeded(
        gateway: Arc<dyn SessionGateway>,
        navigator: Arc<dyn Navigator>,
        identity: Identity,
    ) -> Self {
        Self::with_session(gateway, navigator, Session::signed_in(identity))
    }

    fn with_session(
        gateway: Arc<dyn SessionGateway>,
        navigator: Arc<dyn Navigator>,
        session: Session,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: watch::Sender::new(session),
                gateway,
                navigator,
                generation: AtomicU64::new(0),
                pending: Mutex::new(None),
            }),
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Change notifications for UI bindings.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn session_checked(&self) -> bool {
        self.inner.state.borrow().session_checked()
    }

    pub fn user_id(&self) -> Option<String> {
        self.inner.state.borrow().user_id().map(str::to_owned)
    }

    pub fn user_name(&self) -> Option<String> {
        self.inner.state.borrow().user_name().map(str::to_owned)
    }

    pub fn user_email(&self) -> Option<String> {
        self.inner.state.borrow().user_email().map(str::to_owned)
    }

    pub fn user_avatar(&self) -> Option<String> {
        self.inner.state.borrow().user_avatar().map(str::to_owned)
    }

    /// Ask the server whether the session cookie still names a user.
    ///
    /// Never fails: any error leaves the store anonymous. The check is
    /// marked complete in every outcome so a waiting navigation is never
    /// stuck. Callers arriving while a restoration is already in flight
    /// wait for that one instead of issuing another request.
    pub async fn restore_session(&self) {
        if self.is_authenticated() {
            self.inner.state.send_modify(Session::mark_checked);
            return;
        }

        let pending = {
            let mut slot = self.inner.pending_slot();
            match slot.as_ref() {
                Some((_, pending)) => {
                    debug!("Joining in-flight session restoration");
                    pending.clone()
                }
                None => {
                    let generation = self.inner.generation.load(Ordering::SeqCst);
                    let gateway = Arc::clone(&self.inner.gateway);
                    let weak: Weak<Inner> = Arc::downgrade(&self.inner);
                    let pending = async move {
                        let outcome = gateway.fetch_current_user().await;
                        if let Some(inner) = weak.upgrade() {
                            inner.settle(generation, outcome);
                        }
                    }
                    .boxed()
                    .shared();
                    *slot = Some((generation, pending.clone()));
                    pending
                }
            }
        };

        pending.await;
    }

    /// Install a complete identity and mark the session checked.
    pub fn set_user(&self, identity: Identity) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        info!(user_id = %identity.user_id, "User signed in");
        self.inner.state.send_modify(|s| s.install(identity));
    }

    /// Sign in through the gateway. Unlike restoration, failures are
    /// returned so the login form can show them.
    pub async fn login(&self, request: &LoginRequest) -> Result<Identity> {
        let identity = self.inner.gateway.login(request).await?;
        self.set_user(identity.clone());
        Ok(identity)
    }

    /// End the session.
    ///
    /// The server call is best-effort; local state is cleared and the client
    /// is sent to the landing page whatever it returns. This is the only
    /// path that makes `session_checked` false again.
    pub async fn logout(&self) {
        if let Err(e) = self.inner.gateway.logout().await {
            warn!(error = %e, "Logout request failed");
        }

        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.pending_slot().take();
        self.inner.state.send_modify(Session::clear);
        info!("Session cleared");

        self.inner.navigator.push(Route::Home);
    }
}

impl Inner {
    fn pending_slot(&self) -> MutexGuard<'_, Option<(u64, PendingRestore)>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, generation: u64, outcome: Result<Option<Identity>>) {
        if self.generation.load(Ordering::SeqCst) == generation {
            match outcome {
                Ok(Some(identity)) => {
                    info!(user_id = %identity.user_id, "Session restored");
                    self.state.send_modify(|s| s.install(identity));
                }
                Ok(None) => {
                    debug!("No active session");
                    self.state.send_modify(Session::mark_checked);
                }
                Err(e) if e.is_unauthorized() => {
                    debug!("Session cookie missing or expired");
                    self.state.send_modify(Session::mark_checked);
                }
                Err(e) => {
                    warn!(error = %e, "Session restoration failed, continuing anonymous");
                    self.state.send_modify(Session::mark_checked);
                }
            }
        } else {
            debug!("Discarding restoration result superseded by logout or sign-in");
        }

        let mut slot = self.pending_slot();
        if matches!(slot.as_ref(), Some((g, _)) if *g == generation) {
            slot.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::HistoryNavigator;
    use crate::testing::MockGateway;
    use gallery_client::ClientError;
    use std::time::Duration;

    fn store(gateway: MockGateway) -> (SessionStore, Arc<MockGateway>, Arc<HistoryNavigator>) {
        let gateway = Arc::new(gateway);
        let navigator = Arc::new(HistoryNavigator::new());
        let store = SessionStore::new(gateway.clone(), navigator.clone());
        (store, gateway, navigator)
    }

    fn alice() -> Identity {
        Identity::new("u1", "alice", "alice@example.com").with_avatar("/a.png")
    }

    #[test]
    fn starts_empty_and_unchecked() {
        let (store, _, _) = store(MockGateway::new());
        assert!(!store.session_checked());
        assert!(!store.is_authenticated());
        assert_eq!(store.user_id(), None);
    }

    #[test]
    fn set_user_installs_every_field() {
        let (store, gateway, _) = store(MockGateway::new());
        store.set_user(alice());

        assert!(store.is_authenticated());
        assert!(store.session_checked());
        assert_eq!(store.user_id().as_deref(), Some("u1"));
        assert_eq!(store.user_name().as_deref(), Some("alice"));
        assert_eq!(store.user_email().as_deref(), Some("alice@example.com"));
        assert_eq!(store.user_avatar().as_deref(), Some("/a.png"));
        assert_eq!(gateway.total_calls(), 0);
    }

    #[tokio::test]
    async fn restore_installs_server_identity() {
        let (store, gateway, _) = store(MockGateway::new().with_user(alice()));
        store.restore_session().await;

        assert!(store.session_checked());
        assert_eq!(store.snapshot().identity(), Some(&alice()));
        assert_eq!(gateway.current_user_calls(), 1);
    }

    #[tokio::test]
    async fn restore_failure_is_swallowed_and_checked() {
        let (store, _, _) =
            store(MockGateway::new().with_failure(ClientError::Network("refused".into())));
        store.restore_session().await;

        assert!(store.session_checked());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn restore_empty_answer_is_anonymous() {
        let (store, _, _) = store(MockGateway::new().with_anonymous());
        store.restore_session().await;

        assert!(store.session_checked());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn restore_when_authenticated_skips_the_network() {
        let (store, gateway, _) = store(MockGateway::new());
        store.set_user(alice());

        store.restore_session().await;
        store.restore_session().await;

        assert_eq!(gateway.current_user_calls(), 0);
        assert!(store.session_checked());
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_restores_share_one_request() {
        let (store, gateway, _) = store(
            MockGateway::new()
                .with_user(alice())
                .with_delay(Duration::from_millis(200)),
        );

        tokio::join!(
            store.restore_session(),
            store.restore_session(),
            store.restore_session()
        );

        assert_eq!(gateway.current_user_calls(), 1);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn sequential_anonymous_restores_each_ask_the_server() {
        let (store, gateway, _) = store(MockGateway::new());
        store.restore_session().await;
        store.restore_session().await;

        assert_eq!(gateway.current_user_calls(), 2);
    }

    #[tokio::test]
    async fn logout_clears_state_and_goes_home() {
        let (store, gateway, navigator) = store(MockGateway::new());
        store.set_user(alice());

        store.logout().await;

        assert!(!store.is_authenticated());
        assert!(!store.session_checked());
        assert_eq!(store.user_email(), None);
        assert_eq!(gateway.logout_calls(), 1);
        assert_eq!(navigator.current(), Some(Route::Home));
    }

    #[tokio::test]
    async fn logout_failure_still_clears_and_navigates() {
        let (store, _, navigator) = store(MockGateway::new().with_failing_logout());
        store.set_user(alice());

        store.logout().await;

        assert!(!store.is_authenticated());
        assert!(!store.session_checked());
        assert_eq!(navigator.history(), vec![Route::Home]);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_during_restore_discards_the_late_answer() {
        let (store, _, _) = store(
            MockGateway::new()
                .with_user(alice())
                .with_delay(Duration::from_millis(500)),
        );

        let restoring = {
            let store = store.clone();
            tokio::spawn(async move { store.restore_session().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.logout().await;
        restoring.await.unwrap();

        assert!(!store.is_authenticated());
        assert!(!store.session_checked());
    }

    #[tokio::test]
    async fn login_installs_identity() {
        let (store, gateway, _) = store(MockGateway::new().with_login(alice()));
        let identity = store
            .login(&LoginRequest::new("alice@example.com", "pw"))
            .await
            .unwrap();

        assert_eq!(identity, alice());
        assert!(store.is_authenticated());
        assert_eq!(gateway.login_calls(), 1);
    }

    #[tokio::test]
    async fn login_failure_is_returned() {
        let (store, _, _) = store(MockGateway::new());
        let err = store
            .login(&LoginRequest::new("alice@example.com", "wrong"))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!store.is_authenticated());
        assert!(!store.session_checked());
    }

    #[tokio::test]
    async fn subscribers_see_restoration_result() {
        let (store, _, _) = store(MockGateway::new().with_user(alice()));
        let mut rx = store.subscribe();

        store.restore_session().await;

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_authenticated());
    }

    #[test]
    fn preseeded_store_is_checked() {
        let gateway = Arc::new(MockGateway::new());
        let store = SessionStore::preseeded(
            gateway,
            Arc::new(HistoryNavigator::new()),
            Identity::dev_mock(),
        );
        assert!(store.session_checked());
        assert_eq!(store.user_id().as_deref(), Some("mock-user-id"));
    }

    #[tokio::test]
    async fn failed_restore_keeps_an_already_checked_session_checked() {
        let (store, _, _) = store(
            MockGateway::new()
                .with_anonymous()
                .with_failure(ClientError::Network("refused".into())),
        );

        store.restore_session().await;
        assert!(store.session_checked());

        store.restore_session().await;
        assert!(store.session_checked());
        assert!(!store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_during_restore_wins_over_late_answer() {
        let bob = Identity::new("u2", "bob", "bob@example.com");
        let (store, _, _) = store(
            MockGateway::new()
                .with_user(bob)
                .with_delay(Duration::from_millis(500)),
        );

        let restoring = {
            let store = store.clone();
            tokio::spawn(async move { store.restore_session().await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.set_user(alice());
        restoring.await.unwrap();

        assert_eq!(store.snapshot().identity(), Some(&alice()));
        assert!(store.session_checked());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_restore_does_not_keep_the_store_alive() {
        let (store, gateway, _) = store(MockGateway::new().with_delay(Duration::from_secs(3600)));
        let inner = Arc::downgrade(&store.inner);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), store.restore_session()).await;
        assert!(abandoned.is_err());
        assert_eq!(gateway.current_user_calls(), 1);

        drop(store);

        assert!(inner.upgrade().is_none());
        assert_eq!(Arc::strong_count(&gateway), 1);
    }
}
