//! Security module
//!
//! Provides the shared-secret check used by every gated route.

pub mod credential;

// Re-export commonly used items
pub use credential::{credentials_match, AuthError, AuthSecret, DEFAULT_PASSWORD};
