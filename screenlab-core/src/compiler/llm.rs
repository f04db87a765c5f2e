//! OpenAI-compatible chat-completions client for the fallback stage.
//!
//! Blocking `reqwest` with explicit timeouts, a byte ceiling on the reply
//! body, and exponential-backoff retry limited to transient failures.

use super::error::OracleError;
use super::fallback::LanguageModel;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};

// ─── Configuration ───────────────────────────────────────────────────

/// Upper bound on a single retry wait.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Settings for the language-model endpoint. Every field has a default so a
/// partial `[model]` table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub max_response_bytes: usize,
    /// Extra attempts after the first; 0 disables retry.
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.novita.ai/v3/openai".into(),
            model: "moonshotai/kimi-k2-instruct".into(),
            api_key_env: "NOVITA_API_KEY".into(),
            temperature: 0.0,
            max_tokens: 200,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_response_bytes: 64 * 1024,
            max_retries: 1,
            retry_base_delay_ms: 500,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Delay before retry `attempt` (1-based): base * 2^(attempt-1), capped
    /// at [`MAX_RETRY_DELAY`].
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_base_delay()
            .saturating_mul(factor)
            .min(MAX_RETRY_DELAY)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// ─── Wire envelope ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text of the first choice, trimmed. Blank text is [`OracleError::EmptyReply`].
pub(crate) fn parse_envelope(raw: &[u8]) -> Result<String, OracleError> {
    let resp: ChatResponse =
        serde_json::from_slice(raw).map_err(|e| OracleError::MalformedEnvelope(e.to_string()))?;
    let content = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| OracleError::MalformedEnvelope("no choices in response".into()))?
        .message
        .content
        .unwrap_or_default();
    let content = content.trim();
    if content.is_empty() {
        return Err(OracleError::EmptyReply);
    }
    Ok(content.to_string())
}

/// Read at most `limit` bytes; one byte more is an error, not a truncation.
pub(crate) fn read_limited(reader: impl Read, limit: usize) -> Result<Vec<u8>, OracleError> {
    let mut buf = Vec::new();
    reader
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::TimedOut => OracleError::Timeout,
            _ => OracleError::Network(e.to_string()),
        })?;
    if buf.len() > limit {
        return Err(OracleError::ResponseTooLarge { limit });
    }
    Ok(buf)
}

// ─── Client ──────────────────────────────────────────────────────────

pub struct OpenAiCompatibleClient {
    client: reqwest::blocking::Client,
    config: ModelConfig,
}

impl OpenAiCompatibleClient {
    pub fn new(config: ModelConfig) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| OracleError::Network(format!("client setup: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn api_key(&self) -> Result<String, OracleError> {
        std::env::var(&self.config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| OracleError::NotConfigured(self.config.api_key_env.clone()))
    }
}

impl LanguageModel for OpenAiCompatibleClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let key = self.api_key()?;
        let url = self.config.endpoint();
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_delay(attempt);
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying language model request");
                std::thread::sleep(delay);
            }

            match self.client.post(&url).bearer_auth(&key).json(&body).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        let err = OracleError::Http {
                            status: status.as_u16(),
                        };
                        if err.is_transient() {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                    let raw = read_limited(resp, self.config.max_response_bytes)?;
                    debug!(bytes = raw.len(), "language model replied");
                    return parse_envelope(&raw);
                }
                Err(e) => {
                    let err = if e.is_timeout() {
                        OracleError::Timeout
                    } else {
                        OracleError::Network(e.to_string())
                    };
                    if e.is_connect() || e.is_timeout() {
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| OracleError::Network("max retries exceeded".into())))
    }
}
