use async_trait::async_trait;

use super::{AiClient, Prompt};

/// Deterministic stand-in for the provider, used in development and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubClient;

#[async_trait]
impl AiClient for StubClient {
    async fn generate(&self, prompt: &Prompt) -> anyhow::Result<String> {
        Ok(format!("You said: {}", prompt.text.trim()))
    }
}
