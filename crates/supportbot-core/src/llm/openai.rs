use crate::constants::{endpoints, models};
use crate::error::{error_chain, Result, SupportError};
use crate::llm::traits::*;
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Client for any endpoint speaking the OpenAI `/v1/chat/completions` protocol.
///
/// Stateless apart from connection settings: the transcript is passed in on
/// every call and nothing is retried.
pub struct OpenAIClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: Option<f32>,
    // Whole-request deadline, applied to batch calls only.
    timeout: Option<Duration>,
}

impl OpenAIClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: models::DEFAULT_OPENAI_MODEL.to_string(),
            base_url: endpoints::OPENAI_BASE_URL.to_string(),
            temperature: None,
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Bound connecting and every wait for data by `timeout`. Batch calls
    /// must also finish within it; a stream may run as long as fragments keep
    /// arriving.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| SupportError::Config(format!("failed to build HTTP client: {e}")))?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, endpoints::CHAT_COMPLETIONS_PATH)
    }

    fn request(&self, messages: &[Message], stream: bool) -> reqwest::RequestBuilder {
        let body = OpenAIRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            stream: stream.then_some(true),
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            stream,
            "sending completion request"
        );

        let mut req = self.client.post(self.url()).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        if let (false, Some(timeout)) = (stream, self.timeout) {
            req = req.timeout(timeout);
        }
        req
    }
}

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
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
}

/// Turn a non-success HTTP response into an upstream error, preferring the
/// structured message when the body carries one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|env| env.error.message)
        .unwrap_or(body);

    warn!(%status, %detail, "completion request rejected");
    Err(SupportError::upstream(format!("HTTP {status}: {detail}")))
}

#[async_trait::async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, messages: &[Message]) -> Result<LlmResponse> {
        let response = self.request(messages, false).send().await?;
        let response = check_status(response).await?;
        let response_text = response.text().await?;

        let api_response: OpenAIResponse = serde_json::from_str(&response_text)
            .map_err(|e| SupportError::upstream(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SupportError::upstream("No choices in response"))?;

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| SupportError::upstream("Empty content in response"))?;

        Ok(LlmResponse {
            content,
            finish_reason: choice.finish_reason,
        })
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<FragmentStream> {
        let response = self.request(messages, true).send().await?;
        let response = check_status(response).await?;

        let (tx, rx) = mpsc::unbounded();

        let mut stream = response.bytes_stream();
        tokio::spawn(async move {
            use futures::StreamExt;
            let mut decoder = SseDecoder::default();
            let mut finished = false;

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.unbounded_send(StreamEvent::Error(error_chain(&e)));
                        return;
                    }
                };

                if !forward(decoder.push(&chunk), &tx, &mut finished) {
                    return;
                }
            }

            // The last line may lack its newline.
            if !forward(decoder.finish(), &tx, &mut finished) {
                return;
            }

            // Body ended without a [DONE] sentinel.
            let event = if finished {
                StreamEvent::Done
            } else {
                StreamEvent::Error("stream ended before completion".to_string())
            };
            let _ = tx.unbounded_send(event);
        });

        Ok(rx)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Send decoded frames to the reader. Returns false once nothing more should
/// be read: a terminal event went out or the receiver is gone.
fn forward(
    frames: Vec<SseFrame>,
    tx: &mpsc::UnboundedSender<StreamEvent>,
    finished: &mut bool,
) -> bool {
    for frame in frames {
        let event = match frame {
            SseFrame::Delta(text) => StreamEvent::TextDelta(text),
            SseFrame::Finished => {
                *finished = true;
                continue;
            }
            SseFrame::Done => StreamEvent::Done,
            SseFrame::Error(message) => StreamEvent::Error(message),
        };
        let terminal = !matches!(event, StreamEvent::TextDelta(_));
        // A send error means the receiver is gone: stop reading so the
        // connection is dropped.
        if tx.unbounded_send(event).is_err() {
            trace!("stream receiver dropped, closing connection");
            return false;
        }
        if terminal {
            return false;
        }
    }
    true
}

/// One decoded server-sent event relevant to a chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SseFrame {
    Delta(String),
    /// A choice reported a `finish_reason`; the `[DONE]` sentinel may follow.
    Finished,
    Done,
    Error(String),
}

/// Line-oriented SSE decoder. Bytes are buffered until a full line arrives so
/// multi-byte characters split across chunks decode correctly.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&line);
            frames.extend(parse_data_line(line.trim()));
        }
        frames
    }

    /// Decode whatever is left once the body has ended.
    fn finish(&mut self) -> Vec<SseFrame> {
        let rest = std::mem::take(&mut self.buffer);
        parse_data_line(String::from_utf8_lossy(&rest).trim())
    }
}

fn parse_data_line(line: &str) -> Vec<SseFrame> {
    let Some(data) = line.strip_prefix("data:") else {
        return Vec::new();
    };
    let data = data.trim();
    if data == "[DONE]" {
        return vec![SseFrame::Done];
    }

    let event: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => return vec![SseFrame::Error(format!("malformed stream chunk: {e}"))],
    };

    if let Some(message) = event
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
    {
        return vec![SseFrame::Error(message.to_string())];
    }

    let mut frames = Vec::new();
    if let Some(choice) = event
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    {
        if let Some(content) = choice
            .get("delta")
            .and_then(|d| d.get("content"))
            .and_then(|c| c.as_str())
        {
            if !content.is_empty() {
                frames.push(SseFrame::Delta(content.to_string()));
            }
        }
        if choice.get("finish_reason").is_some_and(|r| !r.is_null()) {
            frames.push(SseFrame::Finished);
        }
    }
    frames
}
