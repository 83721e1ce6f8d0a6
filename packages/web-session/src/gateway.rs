//! Network seams the stores depend on.
//!
//! The stores only see these traits. `GalleryClient` implements them here, so
//! the HTTP crate never needs to know the stores exist.

use async_trait::async_trait;
use gallery_client::{ApiUser, GalleryClient, LoginRequest, Notification};

use crate::auth::Identity;

pub use gallery_client::{ClientError, Result};

/// The authoritative "who is logged in" source.
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Look up the identity behind the current session cookie.
    /// `Ok(None)` means the server answered but reported no user.
    async fn fetch_current_user(&self) -> Result<Option<Identity>>;

    async fn login(&self, request: &LoginRequest) -> Result<Identity>;

    async fn logout(&self) -> Result<()>;
}

/// Source of the notification list.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>>;
}

impl From<ApiUser> for Identity {
    fn from(user: ApiUser) -> Self {
        Identity {
            user_id: user.id,
            display_name: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

#[async_trait]
impl SessionGateway for GalleryClient {
    async fn fetch_current_user(&self) -> Result<Option<Identity>> {
        Ok(self.current_user().await?.map(Identity::from))
    }

    async fn login(&self, request: &LoginRequest) -> Result<Identity> {
        GalleryClient::login(self, request).await.map(Identity::from)
    }

    async fn logout(&self) -> Result<()> {
        GalleryClient::logout(self).await
    }
}

#[async_trait]
impl NotificationSource for GalleryClient {
    async fn fetch_notifications(&self) -> Result<Vec<Notification>> {
        self.notifications().await
    }
}
