//! Programmatic navigation.

use std::sync::{Mutex, PoisonError};

use crate::routes::Route;

/// Pushes a new destination onto the router's history.
///
/// The guard itself never navigates; it only answers proceed/redirect. This
/// seam exists for the forced navigation after logout.
pub trait Navigator: Send + Sync {
    fn push(&self, route: Route);
}

/// In-memory history stack.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.entries().last().copied()
    }

    pub fn history(&self) -> Vec<Route> {
        self.entries().clone()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, route: Route) {
        tracing::debug!(to = %route, "Navigating");
        self.entries().push(route);
    }
}
