//! HTTP adapter for the conversation service

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, ChatState};
pub use routes::build_router;
