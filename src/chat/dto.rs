use serde::{Deserialize, Serialize};

/// POST /chat
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/chat
#[derive(Debug, Deserialize)]
pub struct ApiChatRequest {
    pub message: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default, rename = "userName")]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: ChatStatus,
}

impl ChatResponse {
    pub fn success(response: String) -> Self {
        Self {
            response,
            status: ChatStatus::Success,
        }
    }

    pub fn error(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            status: ChatStatus::Error,
        }
    }
}
