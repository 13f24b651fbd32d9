use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::db::{present_fields, ChildEntity, Entity, FieldValue, Record};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Exercise {
    pub id: u64,
    pub user_id: u64,
    pub exercise_type: String,
    pub duration: f64,
    pub intensity: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewExercise {
    pub user_id: u64,
    pub exercise_type: String,
    pub duration: f64,
    pub intensity: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExercisePatch {
    pub exercise_type: Option<String>,
    pub duration: Option<f64>,
    pub intensity: Option<String>,
}

impl Record for NewExercise {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("user_id", self.user_id.into()),
            ("exercise_type", self.exercise_type.into()),
            ("duration", self.duration.into()),
            ("intensity", self.intensity.into()),
        ]
    }
}

impl Record for ExercisePatch {
    fn into_fields(self) -> Vec<(&'static str, FieldValue)> {
        present_fields([
            ("exercise_type", self.exercise_type.map(FieldValue::from)),
            ("duration", self.duration.map(FieldValue::from)),
            ("intensity", self.intensity.map(FieldValue::from)),
        ])
    }
}

impl Entity for Exercise {
    const KIND: &'static str = "exercise";
    const TABLE: &'static str = "exercises";
    const COLUMNS: &'static str = "id, user_id, exercise_type, duration, intensity, created_at";
    const UPDATABLE: &'static [&'static str] = &["exercise_type", "duration", "intensity"];

    type New = NewExercise;
    type Patch = ExercisePatch;
}

impl ChildEntity for Exercise {
    const PARENT_KEY: &'static str = "user_id";
}
