//! Month view of the training cycle.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::cycle::CycleDay;
use crate::error::CoachError;

/// One day of the month overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub cycle_index: u8,
    pub muscle_group: &'static str,
    pub nutrition: &'static str,
}

/// Cycle days for every date of `year`-`month`, in calendar order.
///
/// Only the generator is consulted; stored overrides are not shown here.
pub fn month_overview(year: i32, month: u32) -> Result<Vec<CalendarDay>, CoachError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| CoachError::validation(format!("invalid month {year}-{month:02}")))?;

    let days = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| {
            let day = CycleDay::for_date(date);
            CalendarDay {
                date,
                cycle_index: day.index,
                muscle_group: day.workout().label(),
                nutrition: day.nutrition().label(),
            }
        })
        .collect();

    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn january_2024_starts_on_chest() {
        let days = month_overview(2024, 1).unwrap();
        assert_eq!(days.len(), 31);
        assert_eq!(days[0].muscle_group, "Chest");
        assert_eq!(days[0].nutrition, "High-Carb");
        assert_eq!(days[3].muscle_group, "Rest");
        assert_eq!(days[4].cycle_index, 0);
    }

    #[test]
    fn leap_february_has_29_days() {
        assert_eq!(month_overview(2024, 2).unwrap().len(), 29);
        assert_eq!(month_overview(2025, 2).unwrap().len(), 28);
    }

    #[test]
    fn invalid_month_is_validation_error() {
        assert!(matches!(
            month_overview(2024, 13),
            Err(CoachError::Validation(_))
        ));
        assert!(matches!(
            month_overview(2024, 0),
            Err(CoachError::Validation(_))
        ));
    }

    #[test]
    fn serializes_camel_case() {
        let days = month_overview(2024, 1).unwrap();
        let json = serde_json::to_value(&days[1]).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["cycleIndex"], 1);
        assert_eq!(json["muscleGroup"], "Back");
    }
}
