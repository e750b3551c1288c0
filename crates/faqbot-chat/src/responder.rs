//! Chat responder: prompt assembly, streamed completion, link augmentation.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};

use faqbot_core::Error;

use crate::links;
use crate::providers::{BoxedStream, CompletionService, StreamChunk};
use crate::types::{ChatMessage, GenerationConfig, Turn};

/// Shown to the user whenever generation fails, whatever the cause.
pub const ERROR_REPLY: &str = "❌ Error: Unable to generate a response.";

/// The one failure a caller sees. The underlying cause is kept for logs.
#[derive(Error, Debug)]
#[error("Unable to generate a response")]
pub struct GenerationFailure {
    #[from]
    source: Error,
}

impl GenerationFailure {
    pub fn cause(&self) -> &Error {
        &self.source
    }
}

/// Build the prompt: system message, the history turns, then the new message.
///
/// Missing or empty sides of a turn produce no message.
pub fn build_messages(system_message: &str, history: &[Turn], message: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);

    messages.push(ChatMessage::system(system_message));

    for turn in history {
        if let Some(user) = turn.user.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::user(user));
        }
        if let Some(assistant) = turn.assistant.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage::assistant(assistant));
        }
    }

    messages.push(ChatMessage::user(message));

    messages
}

/// Fold a completion stream into the full reply, fragments in arrival order.
///
/// Returns the reply and the number of fragments it was built from.
pub async fn collect_reply(mut stream: BoxedStream) -> faqbot_core::Result<(String, usize)> {
    let mut reply = String::new();
    let mut fragments = 0usize;

    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Token(text) => {
                fragments += 1;
                reply.push_str(&text);
            }
            StreamChunk::Done { tokens_used } => {
                debug!(tokens_used, fragments, "Completion stream finished");
                return Ok((reply, fragments));
            }
            StreamChunk::Error(e) => return Err(e),
        }
    }

    Ok((reply, fragments))
}

/// Final text shown for a successful reply.
pub fn compose_output(reply: &str, message: &str) -> String {
    format!(
        "**Response:**\n{}\n\n📖 **Useful Articles:** {}\n\n📺 **YouTube Resources:** {}",
        reply,
        links::articles_link(message),
        links::videos_link(message),
    )
}

/// Stateless chat responder over an injected completion service.
#[derive(Clone)]
pub struct Responder {
    service: Arc<dyn CompletionService>,
}

impl Responder {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Generate the composed reply, or the reason it could not be produced.
    pub async fn generate(
        &self,
        message: &str,
        history: &[Turn],
        config: &GenerationConfig,
    ) -> Result<String, GenerationFailure> {
        if message.is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()).into());
        }
        config.validate()?;

        let messages = build_messages(&config.system_message, history, message);
        let stream = self.service.stream_chat(messages, config.sampling());
        let (reply, fragments) = collect_reply(stream).await?;

        info!(fragments, reply_len = reply.len(), "Generated response");
        Ok(compose_output(&reply, message))
    }

    /// Same as [`generate`](Self::generate), with any failure replaced by
    /// [`ERROR_REPLY`].
    pub async fn respond(
        &self,
        message: &str,
        history: &[Turn],
        config: &GenerationConfig,
    ) -> String {
        let start = Instant::now();
        info!(
            service = self.service.name(),
            message_len = message.len(),
            turns = history.len(),
            "Received message"
        );

        match self.generate(message, history, config).await {
            Ok(output) => {
                info!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Successfully generated response"
                );
                output
            }
            Err(failure) => {
                error!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Generation failed: {}",
                    failure.cause()
                );
                ERROR_REPLY.to_string()
            }
        }
    }
}
