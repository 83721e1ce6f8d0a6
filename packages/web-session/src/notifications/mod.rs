//! Notification list cache and toast presenter

mod cache;
mod toast;

pub use cache::{NotificationCache, NotificationError, NotificationStore, DEFAULT_TTL};
pub use gallery_client::{Notification, NotificationId};
pub use toast::{Toast, ToastKind, ToastPresenter, DEFAULT_TOAST_DURATION};
