//! LLM interaction: build chat messages and call the provider for both
//! model calls.
//!
//! The pipeline talks to models through two narrow traits:
//!
//! * [`Transcriber`] turns one page image into markdown.
//! * [`Extractor`] turns the aggregated markdown into a JSON payload.
//!
//! [`VisionTranscriber`] and [`FieldExtractor`] implement them on top of an
//! `Arc<dyn LLMProvider>`. [`openai_compatible`] builds that provider for
//! any server speaking the OpenAI chat-completions API (OpenAI, Ollama,
//! vLLM, LiteLLM, ...). Prompt text lives in [`crate::prompts`].
//!
//! No request is retried. A failure aborts the run, and the caller wraps it
//! with the page index or stage that issued it.

use crate::error::LlmError;
use crate::prompts::TRANSCRIPTION_PROMPT;
use edgequake_llm::{
    ChatMessage, CompletionOptions, ImageData, LLMProvider, LLMResponse, OpenAIProvider,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

// ── Seams ────────────────────────────────────────────────────────────────

/// Page image → markdown.
pub trait Transcriber {
    /// Transcribe page `page` (0-based). The returned text is used verbatim.
    fn transcribe(
        &self,
        page: usize,
        image: ImageData,
    ) -> impl Future<Output = Result<String, LlmError>>;
}

/// Aggregated markdown → raw JSON payload.
pub trait Extractor {
    /// Ask for the filename fields. The payload is decoded by
    /// [`crate::pipeline::extract::parse_fields`].
    fn extract(&self, markdown: &str) -> impl Future<Output = Result<String, LlmError>>;
}

// ── Provider ─────────────────────────────────────────────────────────────

/// Provider for `model` on the OpenAI-compatible server at `endpoint`
/// (the base URL, e.g. `https://api.openai.com/v1`).
///
/// Local servers usually accept any key, so a missing key is sent empty.
pub fn openai_compatible(
    endpoint: &str,
    api_key: Option<&str>,
    model: &str,
) -> Arc<dyn LLMProvider> {
    let provider = OpenAIProvider::compatible(
        api_key.unwrap_or_default(),
        endpoint.trim_end_matches('/'),
    )
    .with_model(model);
    Arc::new(provider)
}

/// One chat round trip, bounded by `timeout` when set.
async fn chat(
    provider: &dyn LLMProvider,
    messages: &[ChatMessage],
    options: Option<&CompletionOptions>,
    timeout: Option<Duration>,
) -> Result<LLMResponse, LlmError> {
    let model = provider.model();
    let start = Instant::now();

    let call = provider.chat(messages, options);
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| LlmError::Timeout {
                model: model.to_string(),
                secs: limit.as_secs(),
            })?,
        None => call.await,
    };

    let response = result.map_err(|source| LlmError::Provider {
        model: model.to_string(),
        source,
    })?;
    debug!(
        "{}: {} input tokens, {} output tokens, {:?}",
        model,
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );
    Ok(response)
}

// ── Implementations ──────────────────────────────────────────────────────

/// Sends each page image with the pinned transcription prompt.
pub struct VisionTranscriber {
    provider: Arc<dyn LLMProvider>,
    timeout: Option<Duration>,
}

impl VisionTranscriber {
    pub fn new(provider: Arc<dyn LLMProvider>, timeout: Option<Duration>) -> Self {
        Self { provider, timeout }
    }

    /// Messages for one page: the system prompt, then the image with no text.
    pub fn messages(image: ImageData) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(TRANSCRIPTION_PROMPT),
            ChatMessage::user_with_images("", vec![image]),
        ]
    }
}

impl Transcriber for VisionTranscriber {
    async fn transcribe(&self, page: usize, image: ImageData) -> Result<String, LlmError> {
        debug!(
            "Page {}: sending {} bytes base64 to {}",
            page,
            image.data.len(),
            self.provider.model()
        );
        let messages = Self::messages(image);
        let response = chat(self.provider.as_ref(), &messages, None, self.timeout).await?;
        Ok(response.content)
    }
}

/// Sends the aggregated markdown with the extraction instruction in JSON mode.
pub struct FieldExtractor {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    timeout: Option<Duration>,
}

impl FieldExtractor {
    /// `system_prompt` is normally [`crate::prompts::extraction_prompt`].
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        system_prompt: String,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            provider,
            system_prompt,
            timeout,
        }
    }

    /// Messages for the aggregated markdown.
    pub fn messages(&self, markdown: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(markdown),
        ]
    }
}

impl Extractor for FieldExtractor {
    async fn extract(&self, markdown: &str) -> Result<String, LlmError> {
        let options = CompletionOptions::json_mode();
        let messages = self.messages(markdown);
        let response =
            chat(self.provider.as_ref(), &messages, Some(&options), self.timeout).await?;

        if response.content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion {
                model: self.provider.model().to_string(),
            });
        }
        Ok(response.content)
    }
}
