//! Database query functions for the `workout_plans` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::models::{WorkoutPlan, WorkoutPlanRow};

/// Fetch the stored workout for an exact date, if any.
pub async fn get_workout_plan_by_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Option<WorkoutPlanRow>> {
    let row = sqlx::query_as::<_, WorkoutPlanRow>(
        "SELECT * FROM workout_plans WHERE plan_date = $1 LIMIT 1",
    )
    .bind(date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to fetch workout plan for {date}"))?;

    Ok(row)
}

/// Store a workout for a date, replacing any existing row for that date.
pub async fn upsert_workout_plan(
    pool: &PgPool,
    date: NaiveDate,
    plan: &WorkoutPlan,
) -> Result<WorkoutPlanRow> {
    let row = sqlx::query_as::<_, WorkoutPlanRow>(
        "INSERT INTO workout_plans (plan_date, muscle_group, exercises) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (plan_date) DO UPDATE \
         SET muscle_group = EXCLUDED.muscle_group, exercises = EXCLUDED.exercises \
         RETURNING *",
    )
    .bind(date)
    .bind(&plan.muscle_group)
    .bind(Json(&plan.exercises))
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to store workout plan for {date}"))?;

    Ok(row)
}

/// Number of stored workout overrides.
pub async fn count_workout_plans(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_plans")
        .fetch_one(pool)
        .await
        .context("failed to count workout plans")?;

    Ok(count)
}
