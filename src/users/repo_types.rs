use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::db::{present_fields, Entity, FieldValue, Record};

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, not exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl Record for NewUser {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("name", self.name.into()),
            ("email", self.email.into()),
            ("password_hash", self.password_hash.into()),
        ]
    }
}

impl Record for UserPatch {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        present_fields([
            ("name", self.name.map(FieldValue::from)),
            ("email", self.email.map(FieldValue::from)),
            ("password_hash", self.password_hash.map(FieldValue::from)),
        ])
    }
}

impl Entity for User {
    const KIND: &'static str = "user";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static str = "id, name, email, password_hash, created_at";
    const UPDATABLE: &'static [&'static str] = &["name", "email", "password_hash"];

    type New = NewUser;
    type Patch = UserPatch;
}
