//! Shared application state.

use faqbot_chat::{InferenceConfig, Responder};

/// Shared application state accessible from all route handlers.
///
/// Read-only after startup; every chat request is independent.
pub struct AppState {
    pub inference: InferenceConfig,
    pub responder: Responder,
}

impl AppState {
    pub fn new(inference: InferenceConfig, responder: Responder) -> Self {
        Self {
            inference,
            responder,
        }
    }
}
