use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Plan content
// ---------------------------------------------------------------------------

/// One exercise line in a workout plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub sets_reps: String,
    pub rest_duration: String,
    #[serde(default)]
    pub notes: String,
}

/// The workout for a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub muscle_group: String,
    pub exercises: Vec<Exercise>,
}

/// A named meal and the foods that make it up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub items: Vec<String>,
}

/// The nutrition plan for a single calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub meals: Vec<Meal>,
}

/// A workout as stored for a date. `exercises` is the raw JSONB value, so
/// rows written by other tools keep whatever shape they were given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkoutPlan {
    pub muscle_group: String,
    pub exercises: serde_json::Value,
}

/// A nutrition plan as stored for a date; `meals` is the raw JSONB value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredNutritionPlan {
    pub meals: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A registered user.
///
/// `password_hash` is a bcrypt hash and is never serialized.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub goal: String,
    pub restrictions: String,
    pub frequency: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored workout override for one date.
#[derive(Debug, Clone, FromRow)]
pub struct WorkoutPlanRow {
    pub id: Uuid,
    pub plan_date: NaiveDate,
    pub muscle_group: String,
    pub exercises: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<WorkoutPlanRow> for StoredWorkoutPlan {
    fn from(row: WorkoutPlanRow) -> Self {
        Self {
            muscle_group: row.muscle_group,
            exercises: row.exercises.0,
        }
    }
}

/// A stored nutrition override for one date.
#[derive(Debug, Clone, FromRow)]
pub struct NutritionPlanRow {
    pub id: Uuid,
    pub plan_date: NaiveDate,
    pub meals: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<NutritionPlanRow> for StoredNutritionPlan {
    fn from(row: NutritionPlanRow) -> Self {
        Self { meals: row.meals.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_serializes_camel_case() {
        let ex = Exercise {
            name: "Squat".to_string(),
            sets_reps: "4x8".to_string(),
            rest_duration: "120s".to_string(),
            notes: "Deep".to_string(),
        };
        let json = serde_json::to_value(&ex).unwrap();
        assert_eq!(json["setsReps"], "4x8");
        assert_eq!(json["restDuration"], "120s");
    }

    #[test]
    fn stored_plan_keeps_unknown_exercise_shape() {
        let stored = StoredWorkoutPlan {
            muscle_group: "Core".to_string(),
            exercises: serde_json::json!([{ "name": "Plank", "duration": "60s" }]),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["muscleGroup"], "Core");
        assert_eq!(json["exercises"][0]["duration"], "60s");
        assert!(json["exercises"][0].get("setsReps").is_none());
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            name: "Ada".to_string(),
            goal: "strength".to_string(),
            restrictions: String::new(),
            frequency: 3,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["imageUrl"], serde_json::Value::Null);
        assert_eq!(json["frequency"], 3);
    }
}
