//! Session and navigation state for the gallery web client
//!
//! On every route change the client has to know whether the visitor is signed
//! in, but that answer lives in a cookie-backed server session and arrives
//! asynchronously. This crate owns the pieces that reconcile the two:
//!
//! - [`SessionStore`]: who is logged in, plus the one-shot restoration that
//!   asks the server. Concurrent restorations share one request.
//! - [`NavigationGuard`]: waits for restoration when needed, then allows or
//!   redirects based on the destination's [`RouteAccess`].
//! - [`NotificationStore`]: the notification list, cached for a minute.
//! - [`ToastPresenter`]: one transient message with an auto-hide timer.
//!
//! Everything is created once in an [`AppContext`] and passed to the UI.
//!
//! ```rust,ignore
//! let navigator = Arc::new(HistoryNavigator::new());
//! let app = AppContext::from_config(&Config::from_env()?, navigator)?;
//!
//! match app.guard.before_each(Route::Dashboard).await {
//!     Navigation::Proceed => render(Route::Dashboard),
//!     Navigation::Redirect(to) => render(to),
//! }
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod guard;
pub mod navigator;
pub mod notifications;
pub mod routes;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod navigation_tests;

pub use app::AppContext;
pub use auth::{Identity, Session, SessionStore};
pub use config::Config;
pub use gateway::{NotificationSource, SessionGateway};
pub use guard::{GuardError, Navigation, NavigationGuard};
pub use navigator::{HistoryNavigator, Navigator};
pub use notifications::{
    Notification, NotificationError, NotificationStore, Toast, ToastKind, ToastPresenter,
};
pub use routes::{Route, RouteAccess};
