//! Authentication state

mod session;
mod store;

pub use session::{Identity, Session};
pub use store::SessionStore;
