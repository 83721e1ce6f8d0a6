//! Application context
//!
//! Built once at startup and handed to the routing and UI layers. It owns the
//! one instance of each store; nothing here is a global.

use std::sync::Arc;

use anyhow::{Context, Result};
use gallery_client::GalleryClient;

use crate::auth::{Identity, SessionStore};
use crate::config::Config;
use crate::gateway::{NotificationSource, SessionGateway};
use crate::guard::NavigationGuard;
use crate::navigator::Navigator;
use crate::notifications::{NotificationStore, ToastPresenter};

#[derive(Clone)]
pub struct AppContext {
    pub session: SessionStore,
    pub notifications: NotificationStore,
    pub toast: ToastPresenter,
    pub guard: NavigationGuard,
}

impl AppContext {
    /// Wire the stores to a live gallery API.
    pub fn from_config(config: &Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let client = GalleryClient::with_timeout(&config.api_base_url, config.api_timeout)
            .context("Failed to create gallery API client")?;
        Ok(Self::new(config, Arc::new(client), navigator))
    }

    /// Wire the stores to any gateway implementation.
    pub fn new<G>(config: &Config, api: Arc<G>, navigator: Arc<dyn Navigator>) -> Self
    where
        G: SessionGateway + NotificationSource + 'static,
    {
        let gateway: Arc<dyn SessionGateway> = api.clone();
        let source: Arc<dyn NotificationSource> = api;

        let session = if config.mock_logged_in {
            tracing::info!("MOCK_LOGGED_IN set, starting with the development user");
            SessionStore::preseeded(gateway, navigator, Identity::dev_mock())
        } else {
            SessionStore::new(gateway, navigator)
        };

        Self {
            guard: NavigationGuard::new(session.clone()),
            session,
            notifications: NotificationStore::with_ttl(source, config.notification_cache_ttl),
            toast: ToastPresenter::with_default_duration(config.toast_duration),
        }
    }
}
