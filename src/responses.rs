use serde::Serialize;

/// Body returned by every create endpoint: `{ "id": .., "success": true }`.
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: u64,
    pub success: bool,
}

impl Created {
    pub fn new(id: u64) -> Self {
        Self { id, success: true }
    }
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub updated: bool,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}
