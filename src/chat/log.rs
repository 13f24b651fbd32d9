//! Append-only log of raw chat messages, kept apart from the relational store.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use mongodb::{bson::DateTime, Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChatLogConfig;

/// Document shape in the chat collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
}

impl ChatMessage {
    pub fn now(message: &str) -> Self {
        Self {
            message: message.to_string(),
            created_at: DateTime::now(),
        }
    }
}

#[async_trait]
pub trait ChatLog: Send + Sync {
    async fn append(&self, message: &str) -> anyhow::Result<()>;
}

pub struct MongoChatLog {
    collection: Collection<ChatMessage>,
}

impl MongoChatLog {
    /// The driver connects lazily, so this only fails on a malformed URI.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("configure chat log client")?;
        Ok(Self {
            collection: client.database(database).collection(collection),
        })
    }
}

#[async_trait]
impl ChatLog for MongoChatLog {
    async fn append(&self, message: &str) -> anyhow::Result<()> {
        let result = self
            .collection
            .insert_one(ChatMessage::now(message))
            .await
            .context("insert chat message")?;
        debug!(id = %result.inserted_id, "chat message logged");
        Ok(())
    }
}

/// Used when no chat log store is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChatLog;

#[async_trait]
impl ChatLog for NoopChatLog {
    async fn append(&self, message: &str) -> anyhow::Result<()> {
        debug!(len = message.len(), "chat log disabled; message not stored");
        Ok(())
    }
}

pub async fn from_config(cfg: &ChatLogConfig) -> anyhow::Result<Arc<dyn ChatLog>> {
    match cfg.uri.as_deref() {
        Some(uri) => Ok(Arc::new(
            MongoChatLog::connect(uri, &cfg.database, &cfg.collection).await?,
        )),
        None => Ok(Arc::new(NoopChatLog)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_uses_camel_case_timestamp() {
        let doc = mongodb::bson::to_document(&ChatMessage::now("hello")).unwrap();
        assert_eq!(doc.get_str("message").unwrap(), "hello");
        assert!(doc.get_datetime("createdAt").is_ok());
    }

    #[tokio::test]
    async fn noop_log_accepts_messages() {
        NoopChatLog.append("anything").await.expect("noop never fails");
    }

    #[tokio::test]
    async fn missing_uri_selects_noop_log() {
        let cfg = ChatLogConfig {
            uri: None,
            database: "fitchat".into(),
            collection: "chatmessages".into(),
        };
        let log = from_config(&cfg).await.expect("noop log");
        log.append("hi").await.expect("noop never fails");
    }
}
