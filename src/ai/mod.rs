//! Text generation collaborator used by the chat endpoints.

mod anthropic;
mod stub;

use std::sync::Arc;

use async_trait::async_trait;

pub use anthropic::AnthropicClient;
pub use stub::StubClient;

use crate::config::AiConfig;

/// What the chat layer sends to the model.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub text: String,
    /// Extra instructions placed ahead of the user's text.
    pub context: Option<String>,
}

impl Prompt {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[async_trait]
pub trait AiClient: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> anyhow::Result<String>;
}

/// Real provider when a key is configured, the stub otherwise.
pub fn from_config(cfg: &AiConfig) -> anyhow::Result<Arc<dyn AiClient>> {
    match cfg.api_key.as_deref() {
        Some(key) => Ok(Arc::new(AnthropicClient::new(key, &cfg.model, cfg.max_tokens)?)),
        None => {
            tracing::warn!("ANTHROPIC_API_KEY not set; chat replies come from the stub client");
            Ok(Arc::new(StubClient))
        }
    }
}
