//! OpenAI-compatible chat completion provider (`/v1/chat/completions`).
//!
//! Covers OpenAI itself, Groq's OpenAI endpoint, and local servers speaking
//! the same protocol. All wire types are private to this module — callers
//! only see [`LlmResponse`]. The provider is stateless: one request, one
//! reply, no retries.
//!
//! With `stream = true` the request goes through [`EventSource`]; each
//! message event carries a `choices[0].delta.content` fragment and the
//! fragments are concatenated in arrival order until `[DONE]`. An `error`
//! object inside the stream fails the whole call.

use futures_util::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{GenerationParams, LlmResponse, ProviderError};

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client,
    api_base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    /// Build a provider from config values and an optional API key.
    ///
    /// `api_key` is `None` for keyless local models. When present it is sent
    /// as `Authorization: Bearer <key>` on every request.
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url, model, api_key })
    }

    /// Send `content` as the user message and optionally `system` as the
    /// system prompt. One round trip.
    pub async fn complete(
        &self,
        content: &str,
        system: Option<&str>,
        params: &GenerationParams,
    ) -> Result<LlmResponse, ProviderError> {
        // Some models (gpt-5 family) do not accept a temperature parameter.
        let temperature = if self.model.starts_with("gpt-5") {
            None
        } else {
            Some(params.temperature)
        };

        let mut messages = Vec::new();
        if let Some(sys) = system {
            messages.push(Message { role: "system".to_string(), content: sys.to_string() });
        }
        messages.push(Message { role: "user".to_string(), content: content.to_string() });

        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            top_p: params.top_p,
            max_completion_tokens: params.max_tokens,
            stream: params.stream,
        };

        debug!(
            model = %payload.model,
            temperature = ?payload.temperature,
            top_p = payload.top_p,
            stream = payload.stream,
            content_len = content.len(),
            "sending LLM request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full LLM request payload");
        }

        let mut req = self.client.post(&self.api_base_url).json(&payload);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        if params.stream {
            let mut source = EventSource::new(req).map_err(|e| {
                ProviderError::Request(format!("failed to create event source: {e}"))
            })?;
            let result = read_event_stream(&mut source).await;
            source.close();
            return Ok(LlmResponse { text: result?.trim().to_string() });
        }

        let response = req.send().await.map_err(|e| {
            error!(url = %self.api_base_url, error = %e, "LLM HTTP request failed (transport)");
            ProviderError::Request(e.to_string())
        })?;

        let response = check_status(response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize LLM response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(
            choices = parsed.choices.len(),
            prompt_tokens = parsed.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = parsed.usage.as_ref().map(|u| u.completion_tokens),
            "received LLM response"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&parsed)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(response = %json, "full LLM response payload");
        }

        // An empty reply is not an error here; callers decide what to show.
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        Ok(LlmResponse { text })
    }
}

// ── Event stream ──────────────────────────────────────────────────────────────

const DONE_MARKER: &str = "[DONE]";

/// Drain an event stream, concatenating every delta fragment.
///
/// Stops at `[DONE]` or when the server closes the stream. Transport errors,
/// HTTP errors and in-stream `error` objects all end the call with an error.
async fn read_event_stream(events: &mut EventSource) -> Result<String, ProviderError> {
    let mut text = String::new();
    let mut fragments = 0usize;

    while let Some(event) = events.next().await {
        match event {
            Ok(Event::Open) => continue,
            Ok(Event::Message(message)) => {
                if message.data == DONE_MARKER {
                    break;
                }
                if let Some(fragment) = parse_delta(&message.data)? {
                    text.push_str(&fragment);
                    fragments += 1;
                }
            }
            Err(reqwest_eventsource::Error::StreamEnded) => break,
            Err(reqwest_eventsource::Error::InvalidStatusCode(_, response)) => {
                return Err(error_from_response(response).await);
            }
            Err(e) => {
                error!(error = %e, "LLM stream interrupted");
                return Err(ProviderError::Stream(e.to_string()));
            }
        }
    }

    debug!(fragments, text_len = text.len(), "LLM stream complete");
    Ok(text)
}

fn parse_delta(data: &str) -> Result<Option<String>, ProviderError> {
    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| ProviderError::Stream(format!("malformed stream event: {e}")))?;
    if let Some(err) = chunk.error {
        error!(message = %err.message, "LLM stream carried an error event");
        return Err(ProviderError::Stream(err.message));
    }
    Ok(chunk.choices.into_iter().next().and_then(|c| c.delta.content))
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    top_p: f32,
    max_completion_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UsageData {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

// Error envelope used by OpenAI and compatible APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(error_from_response(response).await)
}

/// Build a [`ProviderError`] from a non-success response, preferring the
/// provider's error envelope over the raw body.
async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%status, %message, "LLM request returned HTTP error");
    ProviderError::Request(message)
}
