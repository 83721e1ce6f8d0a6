//! Single-slot, self-expiring toast

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3300);

/// Visual category of a toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    #[default]
    Error,
    Info,
}

/// What the toast component renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub visible: bool,
}

impl Default for Toast {
    fn default() -> Self {
        Self {
            message: String::new(),
            kind: ToastKind::Info,
            visible: false,
        }
    }
}

/// The armed auto-hide timer.
#[derive(Debug)]
pub(crate) struct DismissalHandle {
    task: JoinHandle<()>,
}

impl DismissalHandle {
    /// Disarm the timer. Harmless if it already fired.
    pub(crate) fn cancel(self) {
        self.task.abort();
    }
}

/// Presents one message at a time; a new message always replaces the
/// current one and restarts the timer.
#[derive(Clone)]
pub struct ToastPresenter {
    inner: Arc<Inner>,
}

struct Inner {
    state: watch::Sender<Toast>,
    pending: Mutex<Option<DismissalHandle>>,
    /// Identifies the most recent show; a timer only hides its own toast.
    generation: AtomicU64,
    default_duration: Duration,
}

impl ToastPresenter {
    pub fn new() -> Self {
        Self::with_default_duration(DEFAULT_TOAST_DURATION)
    }

    pub fn with_default_duration(default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: watch::Sender::new(Toast::default()),
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
                default_duration,
            }),
        }
    }

    pub fn current(&self) -> Toast {
        self.inner.state.borrow().clone()
    }

    pub fn message(&self) -> String {
        self.inner.state.borrow().message.clone()
    }

    pub fn kind(&self) -> ToastKind {
        self.inner.state.borrow().kind
    }

    pub fn visible(&self) -> bool {
        self.inner.state.borrow().visible
    }

    pub fn has_pending_dismissal(&self) -> bool {
        self.inner.pending_slot().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Toast> {
        self.inner.state.subscribe()
    }

    /// Show an error toast for the default duration.
    pub fn show_notification(&self, message: impl Into<String>) {
        self.show_notification_as(message, ToastKind::default());
    }

    /// Show a toast of `kind` for the default duration.
    pub fn show_notification_as(&self, message: impl Into<String>, kind: ToastKind) {
        self.show_notification_with(message, kind, self.inner.default_duration);
    }

    /// Show `message` and hide it after `duration`, replacing whatever is
    /// on screen. Must be called inside a Tokio runtime.
    pub fn show_notification_with(
        &self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Duration,
    ) {
        let mut pending = self.inner.pending_slot();
        if let Some(previous) = pending.take() {
            previous.cancel();
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let message = message.into();
        tracing::debug!(kind = ?kind, duration_ms = duration.as_millis(), "Showing toast");
        self.inner.state.send_modify(|toast| {
            toast.message = message;
            toast.kind = kind;
            toast.visible = true;
        });

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(generation);
            }
        });
        *pending = Some(DismissalHandle { task });
    }

    /// Hide the toast and disarm its timer. Safe to call when hidden.
    pub fn hide_notification(&self) {
        let mut pending = self.inner.pending_slot();
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.hide();
    }
}

impl Default for ToastPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn pending_slot(&self) -> MutexGuard<'_, Option<DismissalHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expire(&self, generation: u64) {
        let mut pending = self.pending_slot();
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        // The timer task is the one running; dropping its handle detaches it.
        pending.take();
        self.hide();
    }

    fn hide(&self) {
        self.state.send_if_modified(|toast| {
            let was_visible = toast.visible;
            toast.visible = false;
            was_visible
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(pending) = self.pending_slot().take() {
            pending.cancel();
        }
    }
}
