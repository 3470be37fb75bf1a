//! Training plans: the generated cycle, the stored-override read path,
//! the month calendar and demo seeding.

pub mod calendar;
pub mod cycle;
pub mod seed;
pub mod service;

pub use calendar::{CalendarDay, month_overview};
pub use cycle::{
    CycleDay, EPOCH, NutritionVariant, WorkoutVariant, cycle_index, generate_nutrition,
    generate_workout,
};
pub use seed::seed_demo_plans;
pub use service::{
    PlanSource, Resolved, ResolvedNutrition, ResolvedWorkout, parse_plan_date, resolve_nutrition,
    resolve_workout,
};
