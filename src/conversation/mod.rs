//! Session store and the request orchestrator built on it

pub mod service;
pub mod store;

pub use service::{ChatResponse, ConversationService};
pub use store::{ConversationStore, SessionHandle};
