//! The model-backed second stage. Whatever goes wrong here, the caller gets
//! a compiled query back: failures become a category-11 placeholder.

use super::error::OracleError;
use super::prompt::SYSTEM_PROMPT;
use crate::condition::{CompiledQuery, Provenance};
use tracing::{debug, warn};

/// Anything that can answer a system + user prompt pair with text.
pub trait LanguageModel: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> Result<String, OracleError>;
}

#[derive(Default)]
pub struct FallbackResolver {
    model: Option<Box<dyn LanguageModel>>,
}

impl std::fmt::Debug for FallbackResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackResolver")
            .field("enabled", &self.model.is_some())
            .finish()
    }
}

impl FallbackResolver {
    pub fn new(model: impl LanguageModel + 'static) -> Self {
        Self {
            model: Some(Box::new(model)),
        }
    }

    /// No model attached; every query resolves to the placeholder.
    pub fn disabled() -> Self {
        Self { model: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    /// Ask the model. Never fails.
    pub fn resolve(&self, text: &str) -> CompiledQuery {
        match self.try_resolve(text) {
            Ok(query) => query,
            Err(diagnostic) => {
                warn!(%diagnostic, "fallback stage failed; emitting placeholder");
                CompiledQuery::fallback(diagnostic)
            }
        }
    }

    fn try_resolve(&self, text: &str) -> Result<CompiledQuery, String> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| "language model not configured".to_string())?;
        let reply = model
            .complete(SYSTEM_PROMPT, text)
            .map_err(|e| e.to_string())?;
        debug!(reply = %reply, "model reply");
        parse_reply(&reply)
    }
}

/// Drop a surrounding Markdown code fence (with or without a language tag).
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body).trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse reply text as a compiled query attributed to the model.
pub fn parse_reply(reply: &str) -> Result<CompiledQuery, String> {
    let body = strip_code_fence(reply);
    if body.is_empty() {
        return Err(OracleError::EmptyReply.to_string());
    }
    let mut query: CompiledQuery = serde_json::from_str(body).map_err(|e| e.to_string())?;
    query.provenance = Provenance::Model;
    Ok(query)
}
