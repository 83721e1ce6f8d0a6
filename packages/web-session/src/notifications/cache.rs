//! Time-boxed notification list cache

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use gallery_client::{Notification, NotificationId};
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::gateway::{ClientError, NotificationSource};

/// How long a fetched list is served without asking the server again.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Error type for notification operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to fetch notifications: {0}")]
    Fetch(#[from] ClientError),
}

/// Cached list plus the time it was fetched.
#[derive(Clone, Debug, Default)]
pub struct NotificationCache {
    notifications: Vec<Notification>,
    last_fetched_at: Option<DateTime<Utc>>,
    fetched_at: Option<Instant>,
}

impl NotificationCache {
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.is_read).count()
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        !self.notifications.is_empty()
            && self.fetched_at.is_some_and(|at| at.elapsed() < ttl)
    }
}

/// Memoized notification list with optimistic local read-marking.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn NotificationSource>,
    ttl: Duration,
    state: watch::Sender<NotificationCache>,
    /// Serializes fetches so a caller arriving mid-fetch sees its result.
    fetch_lock: Mutex<()>,
}

impl NotificationStore {
    pub fn new(source: Arc<dyn NotificationSource>) -> Self {
        Self::with_ttl(source, DEFAULT_TTL)
    }

    pub fn with_ttl(source: Arc<dyn NotificationSource>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                ttl,
                state: watch::Sender::new(NotificationCache::default()),
                fetch_lock: Mutex::new(()),
            }),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.inner.state.borrow().notifications.clone()
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.inner.state.borrow().last_fetched_at
    }

    pub fn unread_count(&self) -> usize {
        self.inner.state.borrow().unread_count()
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationCache> {
        self.inner.state.subscribe()
    }

    /// Return the list, going to the server only when the cache is empty,
    /// older than the TTL, or `force` is set.
    ///
    /// On failure the cached list is left as it was and the error is
    /// returned.
    pub async fn fetch_notifications(
        &self,
        force: bool,
    ) -> Result<Vec<Notification>, NotificationError> {
        let _fetching = self.inner.fetch_lock.lock().await;

        if !force {
            let cache = self.inner.state.borrow();
            if cache.is_fresh(self.inner.ttl) {
                debug!(count = cache.notifications.len(), "Serving cached notifications");
                return Ok(cache.notifications.clone());
            }
        }

        let list = self.inner.source.fetch_notifications().await.map_err(|e| {
            error!(error = %e, "Failed to fetch notifications");
            NotificationError::from(e)
        })?;

        let fetched_at = Instant::now();
        self.inner.state.send_modify(|cache| {
            cache.notifications = list.clone();
            cache.fetched_at = Some(fetched_at);
            cache.last_fetched_at = Some(Utc::now());
        });
        debug!(count = list.len(), force, "Notifications refreshed");

        Ok(list)
    }

    /// Look up a cached entry. Never touches the network.
    pub fn get_notification_by_id(&self, id: NotificationId) -> Option<Notification> {
        self.inner
            .state
            .borrow()
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    /// Flag a cached entry as read in place. Returns whether it was found.
    ///
    /// Local only: telling the server is the caller's job.
    pub fn mark_as_read_in_store(&self, id: NotificationId) -> bool {
        self.inner.state.send_if_modified(|cache| {
            match cache.notifications.iter_mut().find(|n| n.id == id) {
                Some(n) => {
                    n.is_read = true;
                    true
                }
                None => false,
            }
        })
    }
}
