use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::db::{present_fields, ChildEntity, Entity, FieldValue, Record};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Conversation {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewConversation {
    pub user_id: u64,
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationPatch {
    pub title: Option<String>,
}

impl Record for NewConversation {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![("user_id", self.user_id.into()), ("title", self.title.into())]
    }
}

impl Record for ConversationPatch {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        present_fields([("title", self.title.map(FieldValue::from))])
    }
}

impl Entity for Conversation {
    const KIND: &'static str = "conversation";
    const TABLE: &'static str = "conversations";
    const COLUMNS: &'static str = "id, user_id, title, created_at";
    const UPDATABLE: &'static [&'static str] = &["title"];

    type New = NewConversation;
    type Patch = ConversationPatch;
}

impl ChildEntity for Conversation {
    const PARENT_KEY: &'static str = "user_id";
}
