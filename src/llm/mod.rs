//! Completion backends
//!
//! The conversation core only needs text in, text out. `CompletionClient`
//! is that seam; `OllamaClient` is the production implementation and
//! `DeadlineClient` wraps any client with a timeout.

pub mod client;
pub mod ollama;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{CompletionClient, CompletionError, DeadlineClient};
pub use ollama::{OllamaClient, OllamaConfig};
