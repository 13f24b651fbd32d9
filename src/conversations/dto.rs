use serde::Deserialize;

/// POST /api/save-conversation
#[derive(Debug, Deserialize)]
pub struct SaveConversationRequest {
    pub user_id: u64,
    pub title: String,
}
