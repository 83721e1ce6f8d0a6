use serde::{Deserialize, Serialize};

/// The signed-in user as the client knows it.
///
/// Always installed or cleared as a whole; the store never holds a partial
/// identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn new(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            email: email.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Fixed identity used when the client is started with `MOCK_LOGGED_IN`.
    pub fn dev_mock() -> Self {
        Identity::new("mock-user-id", "Dev User", "dev@example.com")
            .with_avatar("/avatars/shadcn.jpg")
    }
}

/// Snapshot of the authentication state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
    checked: bool,
}

impl Session {
    pub(crate) fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            checked: true,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Whether restoration (or an explicit `set_user`) has settled the state
    /// since startup or the last logout.
    pub fn session_checked(&self) -> bool {
        self.checked
    }

    pub fn user_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.user_id.as_str())
    }

    pub fn user_name(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.display_name.as_str())
    }

    pub fn user_email(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.email.as_str())
    }

    pub fn user_avatar(&self) -> Option<&str> {
        self.identity.as_ref().and_then(|i| i.avatar_url.as_deref())
    }

    pub(crate) fn install(&mut self, identity: Identity) {
        self.identity = Some(identity);
        self.checked = true;
    }

    pub(crate) fn mark_checked(&mut self) {
        self.checked = true;
    }

    pub(crate) fn clear(&mut self) {
        self.identity = None;
        self.checked = false;
    }
}
