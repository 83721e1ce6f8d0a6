//! Route definitions for the application

use std::fmt;

/// Who may view a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RouteAccess {
    /// No restriction.
    #[default]
    Public,
    /// Only meaningful to anonymous visitors (landing, login, signup).
    GuestOnly,
    /// Requires a confirmed identity.
    AuthRequired,
}

/// All application routes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    // Guest routes
    Home,
    Login,
    Signup,
    ForgotPassword,

    // Dashboard routes (all nested under /dashboard)
    Dashboard,
    Resource,
    UserAccount,
    UserSettings,
    UserNotifications,
    SettingsGeneral,
    SettingsBilling,
}

impl Route {
    pub fn all() -> &'static [Route] {
        &[
            Route::Home,
            Route::Login,
            Route::Signup,
            Route::ForgotPassword,
            Route::Dashboard,
            Route::Resource,
            Route::UserAccount,
            Route::UserSettings,
            Route::UserNotifications,
            Route::SettingsGeneral,
            Route::SettingsBilling,
        ]
    }

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::ForgotPassword => "/auth/forgot",
            Route::Dashboard => "/dashboard",
            Route::Resource => "/dashboard/resource",
            Route::UserAccount => "/dashboard/user/account",
            Route::UserSettings => "/dashboard/user/settings",
            Route::UserNotifications => "/dashboard/user/notifications",
            Route::SettingsGeneral => "/dashboard/settings/general",
            Route::SettingsBilling => "/dashboard/settings/billing",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Login => "login",
            Route::Signup => "signup",
            Route::ForgotPassword => "forgot-password",
            Route::Dashboard => "dashboard",
            Route::Resource => "resource",
            Route::UserAccount => "user-account",
            Route::UserSettings => "user-settings",
            Route::UserNotifications => "user-notifications",
            Route::SettingsGeneral => "settings-general",
            Route::SettingsBilling => "settings-billing",
        }
    }

    /// Access classification. Every dashboard child inherits the
    /// dashboard's requirement.
    pub fn access(&self) -> RouteAccess {
        match self {
            Route::Home | Route::Login | Route::Signup | Route::ForgotPassword => {
                RouteAccess::GuestOnly
            }
            Route::Dashboard
            | Route::Resource
            | Route::UserAccount
            | Route::UserSettings
            | Route::UserNotifications
            | Route::SettingsGeneral
            | Route::SettingsBilling => RouteAccess::AuthRequired,
        }
    }

    /// Resolve a browser path. Query string, fragment and a trailing slash
    /// are ignored. Unknown paths resolve to `None`.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Route::all().iter().copied().find(|r| r.path() == path)
    }

    pub fn from_name(name: &str) -> Option<Route> {
        Route::all().iter().copied().find(|r| r.name() == name)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Classification for a raw path; unknown paths carry no restriction.
pub fn access_for_path(path: &str) -> RouteAccess {
    Route::from_path(path).map(|r| r.access()).unwrap_or_default()
}
