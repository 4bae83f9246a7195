// src/chat/mod.rs
//! Client side: the session store and the two views over it.
pub mod backend;
pub mod sidebar;
pub mod store;
pub mod transcript;

pub use backend::{ChatBackend, ProxyClient};
pub use store::{SessionStore, SharedStore};
pub use transcript::{RejectReason, SendOutcome, TranscriptView};
