//! Plan store read path.
//!
//! A stored row for the exact date wins and is returned as stored. Without
//! one, the cycle generator supplies the plan. Generated plans are never
//! written back.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;

use gymcoach_db::models::{NutritionPlan, StoredNutritionPlan, StoredWorkoutPlan, WorkoutPlan};
use gymcoach_db::queries::{nutrition_plans, workout_plans};

use super::cycle;
use crate::error::CoachError;

/// Where a resolved plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    Stored,
    Generated,
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stored => "stored",
            Self::Generated => "generated",
        })
    }
}

/// A resolved plan: the stored row as-is, or the cycle's default.
///
/// Serializes untagged, so either variant renders as the bare plan object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved<G, S> {
    Stored(S),
    Generated(G),
}

impl<G, S> Resolved<G, S> {
    pub fn source(&self) -> PlanSource {
        match self {
            Self::Stored(_) => PlanSource::Stored,
            Self::Generated(_) => PlanSource::Generated,
        }
    }
}

pub type ResolvedWorkout = Resolved<WorkoutPlan, StoredWorkoutPlan>;
pub type ResolvedNutrition = Resolved<NutritionPlan, StoredNutritionPlan>;

impl ResolvedWorkout {
    pub fn muscle_group(&self) -> &str {
        match self {
            Self::Stored(plan) => &plan.muscle_group,
            Self::Generated(plan) => &plan.muscle_group,
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_plan_date(raw: &str) -> Result<NaiveDate, CoachError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| CoachError::validation(format!("invalid date {raw:?}: expected YYYY-MM-DD ({e})")))
}

/// Resolve the workout for `date`.
///
/// A storage failure is returned as [`CoachError::Storage`]; it never falls
/// back to the generated plan.
pub async fn resolve_workout(pool: &PgPool, date: NaiveDate) -> Result<ResolvedWorkout, CoachError> {
    let resolved = match workout_plans::get_workout_plan_by_date(pool, date).await? {
        Some(row) => Resolved::Stored(StoredWorkoutPlan::from(row)),
        None => Resolved::Generated(cycle::generate_workout(date)),
    };

    debug!(%date, source = %resolved.source(), muscle_group = %resolved.muscle_group(), "resolved workout");
    Ok(resolved)
}

/// Resolve the nutrition plan for `date`. Same precedence as
/// [`resolve_workout`].
pub async fn resolve_nutrition(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<ResolvedNutrition, CoachError> {
    let resolved = match nutrition_plans::get_nutrition_plan_by_date(pool, date).await? {
        Some(row) => Resolved::Stored(StoredNutritionPlan::from(row)),
        None => Resolved::Generated(cycle::generate_nutrition(date)),
    };

    debug!(%date, source = %resolved.source(), "resolved nutrition");
    Ok(resolved)
}
