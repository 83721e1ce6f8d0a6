//! Navigation guard
//!
//! Runs before every route transition. If the session has not been checked
//! since startup (or since the last logout) the guard waits for restoration
//! first, then decides from the destination's access class:
//!
//! | access       | signed in | outcome                      |
//! |--------------|-----------|------------------------------|
//! | AuthRequired | no        | redirect to login            |
//! | GuestOnly    | yes       | redirect to authenticated home |
//! | anything else|           | proceed                      |

use std::fmt;

use tracing::debug;

use crate::auth::SessionStore;
use crate::routes::{access_for_path, Route, RouteAccess};

/// Outcome of one guard evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::Proceed => f.write_str("proceed"),
            Navigation::Redirect(route) => write!(f, "redirect to {}", route),
        }
    }
}

/// Redirect destinations that would make the guard bounce between routes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("login destination {0} requires authentication")]
    LoginRequiresAuth(Route),

    #[error("authenticated home {0} is guest-only")]
    HomeIsGuestOnly(Route),
}

#[derive(Clone)]
pub struct NavigationGuard {
    session: SessionStore,
    login: Route,
    authenticated_home: Route,
}

impl NavigationGuard {
    /// Guard redirecting to `/login` and `/dashboard`.
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            login: Route::Login,
            authenticated_home: Route::Dashboard,
        }
    }

    pub fn with_destinations(
        session: SessionStore,
        login: Route,
        authenticated_home: Route,
    ) -> Result<Self, GuardError> {
        if login.access() == RouteAccess::AuthRequired {
            return Err(GuardError::LoginRequiresAuth(login));
        }
        if authenticated_home.access() == RouteAccess::GuestOnly {
            return Err(GuardError::HomeIsGuestOnly(authenticated_home));
        }
        Ok(Self {
            session,
            login,
            authenticated_home,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn before_each(&self, to: Route) -> Navigation {
        let outcome = self.evaluate(to.access()).await;
        debug!(to = %to, outcome = %outcome, "Guarded navigation");
        outcome
    }

    /// Same as `before_each` for a raw browser path. Paths that match no
    /// route are always allowed.
    pub async fn before_each_path(&self, path: &str) -> Navigation {
        let outcome = self.evaluate(access_for_path(path)).await;
        debug!(to = path, outcome = %outcome, "Guarded navigation");
        outcome
    }

    async fn evaluate(&self, access: RouteAccess) -> Navigation {
        if !self.session.session_checked() {
            self.session.restore_session().await;
        }
        self.decide(access, self.session.is_authenticated())
    }

    /// The decision table, without any restoration.
    pub fn decide(&self, access: RouteAccess, authenticated: bool) -> Navigation {
        match (access, authenticated) {
            (RouteAccess::AuthRequired, false) => Navigation::Redirect(self.login),
            (RouteAccess::GuestOnly, true) => Navigation::Redirect(self.authenticated_home),
            _ => Navigation::Proceed,
        }
    }
}
