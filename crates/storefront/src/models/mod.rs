//! Request-scoped models for the web layer.
//!
//! Persistent domain types live in `mrshopy_core`; only what the session
//! carries is defined here.

pub mod session;

pub use session::{CurrentUser, Flash};
