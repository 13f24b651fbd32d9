use crate::ai::{self, AiClient};
use crate::chat::{log as chat_log, ChatLog};
use crate::config::AppConfig;
use crate::conversations::Conversation;
use crate::db::{ConnectionManager, Repository};
use crate::exercises::Exercise;
use crate::users::User;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: ConnectionManager,
    pub config: Arc<AppConfig>,
    pub chat_log: Arc<dyn ChatLog>,
    pub ai: Arc<dyn AiClient>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = ConnectionManager::connect(&config.db).await?;
        let chat_log = chat_log::from_config(&config.chat_log).await?;
        let ai = ai::from_config(&config.ai)?;

        Ok(Self::from_parts(db, config, chat_log, ai))
    }

    pub fn from_parts(
        db: ConnectionManager,
        config: Arc<AppConfig>,
        chat_log: Arc<dyn ChatLog>,
        ai: Arc<dyn AiClient>,
    ) -> Self {
        Self {
            db,
            config,
            chat_log,
            ai,
        }
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.db.clone())
    }

    pub fn conversations(&self) -> Repository<Conversation> {
        Repository::new(self.db.clone())
    }

    pub fn exercises(&self) -> Repository<Exercise> {
        Repository::new(self.db.clone())
    }

    #[cfg(test)]
    /// State that never reaches a real database, chat store or provider
    /// unless a test explicitly drives a query through the lazy pool.
    pub fn fake() -> Self {
        let config = Arc::new(fake_config());
        let db = ConnectionManager::lazy(&config.db);
        Self::from_parts(
            db,
            config,
            Arc::new(chat_log::NoopChatLog),
            Arc::new(crate::ai::StubClient),
        )
    }
}

#[cfg(test)]
pub(crate) fn fake_config() -> AppConfig {
    use crate::config::{AiConfig, ChatLogConfig, DbConfig, HttpConfig, QueueLimit};

    AppConfig {
        http: HttpConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        db: DbConfig {
            host: "127.0.0.1".into(),
            user: "test".into(),
            password: "test".into(),
            database: "test".into(),
            port: 1,
            pool_size: 2,
            queue_limit: QueueLimit::Unbounded,
            acquire_timeout_secs: 1,
            query_timeout_secs: 1,
        },
        chat_log: ChatLogConfig {
            uri: None,
            database: "test".into(),
            collection: "chatmessages".into(),
        },
        ai: AiConfig {
            api_key: None,
            model: "test".into(),
            max_tokens: 16,
        },
    }
}
