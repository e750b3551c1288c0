//! Completion service seam and the streaming inference client.
//!
//! The hosted endpoint speaks the OpenAI-compatible chat-completions format
//! and streams tokens via SSE.

use std::pin::Pin;

use futures::Stream;
use reqwest::Client;
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tracing::{debug, warn};

use faqbot_core::{Error, Result};

use crate::config::InferenceConfig;
use crate::types::{ChatMessage, SamplingParams};

/// Boxed stream type for returning different stream implementations.
pub type BoxedStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

/// A single streamed token or error.
#[derive(Debug)]
pub enum StreamChunk {
    Token(String),
    Done { tokens_used: usize },
    Error(Error),
}

/// Anything that turns a prompt into a stream of text fragments.
///
/// The stream is finite and cannot be restarted. An `Error` chunk ends it.
pub trait CompletionService: Send + Sync {
    fn name(&self) -> &str;

    fn stream_chat(&self, messages: Vec<ChatMessage>, params: SamplingParams) -> BoxedStream;
}

/// Client for a hosted chat-completions endpoint.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    config: InferenceConfig,
}

impl InferenceClient {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
}

impl CompletionService for InferenceClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    fn stream_chat(&self, messages: Vec<ChatMessage>, params: SamplingParams) -> BoxedStream {
        Box::pin(stream_chat_completions(
            self.client.clone(),
            self.config.completions_url(),
            self.config.model.clone(),
            self.config.api_token.clone(),
            messages,
            params,
        ))
    }
}

/// JSON body for a streaming chat-completions request.
pub fn request_body(model: &str, messages: &[ChatMessage], params: SamplingParams) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "max_tokens": params.max_tokens,
        "temperature": params.temperature,
        "top_p": params.top_p,
        "stream": true,
    })
}

/// What one SSE line contributed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SseLine {
    Token(String),
    Done,
    /// Blank line, comment, non-data field, or a delta without text.
    Skip,
}

/// Interpret one line of the SSE body.
pub(crate) fn parse_sse_line(line: &str) -> Result<SseLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Ok(SseLine::Skip);
    }

    let Some(data) = line.strip_prefix("data:") else {
        // event:, id:, retry:
        return Ok(SseLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let parsed: Value = serde_json::from_str(data)?;

    if let Some(err) = parsed.get("error").filter(|e| !e.is_null()) {
        let msg = err
            .as_str()
            .map(str::to_string)
            .or_else(|| err["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| err.to_string());
        return Err(Error::Stream(msg));
    }

    // A null or missing content is a keep-alive delta (role-only first chunk,
    // finish chunk), not a fragment.
    match parsed["choices"][0]["delta"]["content"].as_str() {
        Some(content) if !content.is_empty() => Ok(SseLine::Token(content.to_string())),
        _ => Ok(SseLine::Skip),
    }
}

/// Stream from an OpenAI-compatible chat-completions endpoint.
fn stream_chat_completions(
    client: Client,
    url: String,
    model: String,
    api_token: Option<String>,
    messages: Vec<ChatMessage>,
    params: SamplingParams,
) -> impl Stream<Item = StreamChunk> + Send + 'static {
    async_stream::stream! {
        let body = request_body(&model, &messages, params);

        debug!("Streaming from {} with model {}", url, model);

        let mut request = client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(token) = &api_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                yield StreamChunk::Error(Error::Http(format!("Request failed: {}", e)));
                return;
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            yield StreamChunk::Error(Error::Api { status, body });
            return;
        }

        for await chunk in sse_chunks(response.bytes_stream()) {
            yield chunk;
        }
    }
}

/// Split a byte stream into SSE lines and turn them into chunks.
///
/// Lines are split on raw bytes, so a multi-byte character may straddle two
/// network chunks.
pub(crate) fn sse_chunks<S, B, E>(bytes: S) -> impl Stream<Item = StreamChunk> + Send + 'static
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let mut stream = Box::pin(bytes);
        let mut buffer: Vec<u8> = Vec::new();
        let mut token_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    yield StreamChunk::Error(Error::Stream(format!("Stream read error: {}", e)));
                    return;
                }
            };

            buffer.extend_from_slice(bytes.as_ref());

            // Process complete SSE lines
            while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                match decode_line(&raw).and_then(parse_sse_line) {
                    Ok(SseLine::Token(text)) => {
                        token_count += 1;
                        yield StreamChunk::Token(text);
                    }
                    Ok(SseLine::Done) => {
                        yield StreamChunk::Done { tokens_used: token_count };
                        return;
                    }
                    Ok(SseLine::Skip) => {}
                    Err(e) => {
                        warn!("Inference stream error: {}", e);
                        yield StreamChunk::Error(e);
                        return;
                    }
                }
            }
        }

        // Last line without a trailing newline
        if !buffer.is_empty() {
            match decode_line(&buffer).and_then(parse_sse_line) {
                Ok(SseLine::Token(text)) => {
                    token_count += 1;
                    yield StreamChunk::Token(text);
                }
                Ok(SseLine::Done) | Ok(SseLine::Skip) => {}
                Err(e) => {
                    warn!("Inference stream error: {}", e);
                    yield StreamChunk::Error(e);
                    return;
                }
            }
        }

        yield StreamChunk::Done { tokens_used: token_count };
    }
}

fn decode_line(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw).map_err(|e| Error::Stream(format!("Invalid UTF-8 in stream: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_line() {
        let line = r#"data: {"choices":[{"index":0,"delta":{"role":"assistant","content":"Hel"}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), SseLine::Token("Hel".into()));
    }

    #[test]
    fn test_parse_without_space_after_colon() {
        let line = r#"data:{"choices":[{"delta":{"content":"lo"}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), SseLine::Token("lo".into()));
    }

    #[test]
    fn test_parse_done_and_noise() {
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), SseLine::Done);
        assert_eq!(parse_sse_line("").unwrap(), SseLine::Skip);
        assert_eq!(parse_sse_line("\r").unwrap(), SseLine::Skip);
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), SseLine::Skip);
        assert_eq!(parse_sse_line("event: message").unwrap(), SseLine::Skip);
    }

    #[test]
    fn test_null_content_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"content":null},"finish_reason":"stop"}]}"#;
        assert_eq!(parse_sse_line(line).unwrap(), SseLine::Skip);

        let role_only = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(role_only).unwrap(), SseLine::Skip);
    }

    #[test]
    fn test_error_payloads() {
        let plain = parse_sse_line(r#"data: {"error":"Model is overloaded"}"#).unwrap_err();
        assert!(plain.to_string().contains("Model is overloaded"));

        let nested = parse_sse_line(r#"data: {"error":{"message":"bad top_p"}}"#).unwrap_err();
        assert!(nested.to_string().contains("bad top_p"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = parse_sse_line("data: {not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let params = SamplingParams {
            max_tokens: 1,
            temperature: 0.1,
            top_p: 0.1,
        };
        let body = request_body("acme/tiny", &messages, params);

        assert_eq!(body["model"], "acme/tiny");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 1);
        assert_eq!(body["temperature"], 0.1);
        assert_eq!(body["top_p"], 0.1);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    fn byte_chunks(parts: Vec<&'static [u8]>) -> BoxedStream {
        let items: Vec<std::result::Result<Vec<u8>, String>> =
            parts.into_iter().map(|p| Ok(p.to_vec())).collect();
        Box::pin(sse_chunks(futures::stream::iter(items)))
    }

    #[tokio::test]
    async fn test_character_split_across_chunks() {
        let stream = byte_chunks(vec![
            &b"data: {\"choices\":[{\"delta\":{\"content\":\"caf\xC3"[..],
            &b"\xA9\"}}]}\n\ndata: [DONE]\n"[..],
        ]);
        let (reply, fragments) = crate::responder::collect_reply(stream).await.unwrap();
        assert_eq!(reply, "café");
        assert_eq!(fragments, 1);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_an_error() {
        let stream = byte_chunks(vec![&b"data: {\"choices\":[{\"delta\":{\"content\":\"\xC3\"}}]}\n"[..]]);
        let err = crate::responder::collect_reply(stream).await.unwrap_err();
        assert!(matches!(err, Error::Stream(_)));
    }

    #[tokio::test]
    async fn test_read_error_ends_stream() {
        let items: Vec<std::result::Result<Vec<u8>, String>> = vec![
            Ok(b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n".to_vec()),
            Err("connection reset".into()),
        ];
        let stream: BoxedStream = Box::pin(sse_chunks(futures::stream::iter(items)));
        let err = crate::responder::collect_reply(stream).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
