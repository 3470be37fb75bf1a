//! Query functions, one module per table.

pub mod nutrition_plans;
pub mod users;
pub mod workout_plans;
