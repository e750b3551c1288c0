//! Chat responder for a hosted LLM endpoint.
//!
//! Builds the prompt from history, streams the completion from an external
//! inference API, and appends article and video search links to the reply.

pub mod config;
pub mod links;
pub mod providers;
pub mod responder;
pub mod types;

pub use config::InferenceConfig;
pub use providers::{BoxedStream, CompletionService, InferenceClient, StreamChunk};
pub use responder::{GenerationFailure, Responder, ERROR_REPLY};
pub use types::*;
