//! Database query functions for the `nutrition_plans` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::types::Json;

use crate::models::{NutritionPlan, NutritionPlanRow};

/// Fetch the stored nutrition plan for an exact date, if any.
pub async fn get_nutrition_plan_by_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Option<NutritionPlanRow>> {
    let row = sqlx::query_as::<_, NutritionPlanRow>(
        "SELECT * FROM nutrition_plans WHERE plan_date = $1 LIMIT 1",
    )
    .bind(date)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to fetch nutrition plan for {date}"))?;

    Ok(row)
}

/// Store a nutrition plan for a date, replacing any existing row for that date.
pub async fn upsert_nutrition_plan(
    pool: &PgPool,
    date: NaiveDate,
    plan: &NutritionPlan,
) -> Result<NutritionPlanRow> {
    let row = sqlx::query_as::<_, NutritionPlanRow>(
        "INSERT INTO nutrition_plans (plan_date, meals) \
         VALUES ($1, $2) \
         ON CONFLICT (plan_date) DO UPDATE SET meals = EXCLUDED.meals \
         RETURNING *",
    )
    .bind(date)
    .bind(Json(&plan.meals))
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to store nutrition plan for {date}"))?;

    Ok(row)
}
