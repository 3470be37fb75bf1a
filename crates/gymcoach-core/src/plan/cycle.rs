//! The four-day training cycle.
//!
//! Every calendar date maps to one of four fixed days. The mapping counts
//! whole days between the date and [`EPOCH`], ignoring the sign, and takes
//! the count modulo [`CYCLE_LENGTH`]. Dates before the epoch therefore mirror
//! the dates after it: 2023-12-31 and 2024-01-02 fall on the same cycle day.

use std::fmt;

use chrono::NaiveDate;
use gymcoach_db::models::{Exercise, Meal, NutritionPlan, WorkoutPlan};

/// Number of distinct days in the cycle.
pub const CYCLE_LENGTH: u64 = 4;

/// Reference date from which cycle offsets are counted.
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2024, 1, 1) {
    Some(d) => d,
    None => panic!("epoch is a valid date"),
};

/// Position of `date` in the cycle, in `0..CYCLE_LENGTH`.
pub fn cycle_index(date: NaiveDate) -> u8 {
    let diff_days = (date - EPOCH).num_days().unsigned_abs();
    // diff_days % 4 always fits.
    (diff_days % CYCLE_LENGTH) as u8
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// Muscle group trained on a cycle day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutVariant {
    Chest,
    Back,
    Legs,
    Rest,
}

impl WorkoutVariant {
    pub fn from_index(index: u8) -> Self {
        match index % CYCLE_LENGTH as u8 {
            0 => Self::Chest,
            1 => Self::Back,
            2 => Self::Legs,
            _ => Self::Rest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Chest => "Chest",
            Self::Back => "Back",
            Self::Legs => "Legs",
            Self::Rest => "Rest",
        }
    }

    /// Exercises as `(name, sets x reps, rest, notes)`.
    fn exercises(self) -> &'static [(&'static str, &'static str, &'static str, &'static str)] {
        match self {
            Self::Chest => &[
                ("Flat Bench Press", "4x8", "120s", "Controlled descent"),
                ("Dumbbell Flyes", "3x12", "60s", "Stretch at the bottom"),
                ("Incline Press", "3x10", "90s", "Upper chest focus"),
            ],
            Self::Back => &[
                ("Lat Pulldown", "4x10", "90s", "Elbows low"),
                ("Seated Cable Row", "3x12", "60s", "Full stretch"),
                ("Barbell Row", "4x8", "120s", "Keep the back straight"),
            ],
            Self::Legs => &[
                ("Squat", "4x8", "120s", "Deep"),
                ("Leg Press", "3x12", "90s", "Push through the heels"),
                ("Leg Extension", "3x15", "60s", "Burn"),
            ],
            Self::Rest => &[],
        }
    }

    pub fn plan(self) -> WorkoutPlan {
        WorkoutPlan {
            muscle_group: self.label().to_owned(),
            exercises: self
                .exercises()
                .iter()
                .map(|&(name, sets_reps, rest, notes)| Exercise {
                    name: name.to_owned(),
                    sets_reps: sets_reps.to_owned(),
                    rest_duration: rest.to_owned(),
                    notes: notes.to_owned(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for WorkoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Diet style paired with a cycle day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionVariant {
    HighCarb,
    LowCarb,
    Balanced,
    Detox,
}

impl NutritionVariant {
    pub fn from_index(index: u8) -> Self {
        match index % CYCLE_LENGTH as u8 {
            0 => Self::HighCarb,
            1 => Self::LowCarb,
            2 => Self::Balanced,
            _ => Self::Detox,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::HighCarb => "High-Carb",
            Self::LowCarb => "Low-Carb",
            Self::Balanced => "Balanced",
            Self::Detox => "Detox",
        }
    }

    /// Meals as `(name, items)`, in serving order.
    fn meals(self) -> [(&'static str, [&'static str; 3]); 3] {
        match self {
            Self::HighCarb => [
                ("Breakfast", ["Oat porridge (80g)", "Banana", "Protein powder"]),
                ("Lunch", ["Basmati rice (100g)", "Chicken breast (150g)", "Zucchini"]),
                ("Dinner", ["Sweet potatoes (200g)", "Cod (200g)", "Extra-virgin olive oil"]),
            ],
            Self::LowCarb => [
                ("Breakfast", ["Scrambled eggs (3)", "Avocado toast", "Black coffee"]),
                ("Lunch", ["Mixed salad", "Tuna in water (150g)", "Walnuts"]),
                ("Dinner", ["Grilled salmon (200g)", "Asparagus", "Extra-virgin olive oil"]),
            ],
            Self::Balanced => [
                ("Breakfast", ["Greek yogurt (200g)", "Honey", "Mixed berries"]),
                ("Lunch", ["Whole-wheat pasta (80g)", "Lean ground beef (150g)", "Tomato sauce"]),
                ("Dinner", ["Turkey (150g)", "Grilled vegetables", "Whole-wheat bread (50g)"]),
            ],
            Self::Detox => [
                ("Breakfast", ["Green smoothie", "Apple", "Almonds"]),
                ("Lunch", ["Quinoa (80g)", "Chickpeas (100g)", "Cherry tomatoes"]),
                ("Dinner", ["Pumpkin soup", "Light ricotta (100g)", "Croutons"]),
            ],
        }
    }

    pub fn plan(self) -> NutritionPlan {
        NutritionPlan {
            meals: self
                .meals()
                .iter()
                .map(|(name, items)| Meal {
                    name: (*name).to_owned(),
                    items: items.iter().map(|s| (*s).to_owned()).collect(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for NutritionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Cycle day
// ---------------------------------------------------------------------------

/// A date's place in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDay {
    pub index: u8,
}

impl CycleDay {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            index: cycle_index(date),
        }
    }

    pub fn workout(self) -> WorkoutVariant {
        WorkoutVariant::from_index(self.index)
    }

    pub fn nutrition(self) -> NutritionVariant {
        NutritionVariant::from_index(self.index)
    }
}

/// The default workout for `date`.
pub fn generate_workout(date: NaiveDate) -> WorkoutPlan {
    CycleDay::for_date(date).workout().plan()
}

/// The default nutrition plan for `date`.
pub fn generate_nutrition(date: NaiveDate) -> NutritionPlan {
    CycleDay::for_date(date).nutrition().plan()
}
