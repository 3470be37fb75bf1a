//! Demo data for a fresh database.

use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::info;

use gymcoach_db::models::{Exercise, Meal, NutritionPlan, WorkoutPlan};
use gymcoach_db::queries::{nutrition_plans, workout_plans};

use crate::error::CoachError;

fn demo_workout() -> WorkoutPlan {
    WorkoutPlan {
        muscle_group: "Legs".to_owned(),
        exercises: vec![
            Exercise {
                name: "Squat".to_owned(),
                sets_reps: "4x8".to_owned(),
                rest_duration: "120s".to_owned(),
                notes: "Deep".to_owned(),
            },
            Exercise {
                name: "Leg Press".to_owned(),
                sets_reps: "3x12".to_owned(),
                rest_duration: "90s".to_owned(),
                notes: "Push".to_owned(),
            },
        ],
    }
}

fn demo_nutrition() -> NutritionPlan {
    NutritionPlan {
        meals: vec![
            Meal {
                name: "Breakfast".to_owned(),
                items: vec!["Yogurt".to_owned(), "Honey".to_owned()],
            },
            Meal {
                name: "Lunch".to_owned(),
                items: vec!["Rice".to_owned(), "Chicken".to_owned()],
            },
        ],
    }
}

/// Store a demo workout and nutrition plan for `date` when no workout rows
/// exist yet.
///
/// Returns `true` when rows were written.
pub async fn seed_demo_plans(pool: &PgPool, date: NaiveDate) -> Result<bool, CoachError> {
    if workout_plans::count_workout_plans(pool).await? > 0 {
        info!("workout plans already present, skipping demo seed");
        return Ok(false);
    }

    workout_plans::upsert_workout_plan(pool, date, &demo_workout()).await?;
    nutrition_plans::upsert_nutrition_plan(pool, date, &demo_nutrition()).await?;

    info!(%date, "seeded demo plans");
    Ok(true)
}
