use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use time::{Date, Duration};
use uuid::Uuid;

use super::repo_types::MealPlan;

pub const DAYS_PER_WEEK: i64 = 7;
pub const MAX_RANGE_DAYS: i64 = 62;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Column holding this slot in `meal_plans`.
    pub fn column(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            _ => Err(format!(
                "Invalid meal slot '{}'. Valid options: breakfast, lunch, dinner",
                s
            )),
        }
    }
}

/// Last day of the week starting at `start`; `None` past the end of the calendar.
pub fn week_end(start: Date) -> Option<Date> {
    start.checked_add(Duration::days(DAYS_PER_WEEK - 1))
}

/// Exactly seven consecutive days from `start`, each paired with its plan if any.
pub fn week_days(start: Date, plans: &[MealPlan]) -> Vec<(Date, Option<&MealPlan>)> {
    let by_date: HashMap<Date, &MealPlan> = plans.iter().map(|p| (p.date, p)).collect();
    (0..DAYS_PER_WEEK)
        .map_while(|i| start.checked_add(Duration::days(i)))
        .map(|d| (d, by_date.get(&d).copied()))
        .collect()
}

/// Every planned dish occurrence in the given plans.
pub fn planned_dish_ids(plans: &[MealPlan]) -> Vec<Uuid> {
    plans.iter().flat_map(|p| p.dish_ids()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};

    fn plan(date: Date, breakfast: Option<Uuid>, dinner: Option<Uuid>) -> MealPlan {
        MealPlan {
            owner_id: Uuid::nil(),
            date,
            breakfast,
            lunch: None,
            dinner,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn slot_parse_and_display() {
        assert_eq!("Lunch".parse::<MealSlot>().unwrap(), MealSlot::Lunch);
        assert!("brunch".parse::<MealSlot>().is_err());
        assert_eq!(MealSlot::Dinner.to_string(), "dinner");
    }

    #[test]
    fn week_has_seven_days_across_month_end() {
        let start = date!(2026 - 01 - 29);
        let plans = vec![plan(date!(2026 - 02 - 02), Some(Uuid::new_v4()), None)];
        let week = week_days(start, &plans);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].0, start);
        assert_eq!(week[6].0, date!(2026 - 02 - 04));
        assert_eq!(week_end(start), Some(date!(2026 - 02 - 04)));
        assert!(week[4].1.is_some());
        assert_eq!(week.iter().filter(|(_, p)| p.is_some()).count(), 1);
    }

    #[test]
    fn week_past_the_last_calendar_day_has_no_end() {
        assert_eq!(week_end(date!(9999 - 12 - 30)), None);
        assert_eq!(week_end(date!(9999 - 12 - 25)), Some(date!(9999 - 12 - 31)));
        assert_eq!(week_days(date!(9999 - 12 - 30), &[]).len(), 2);
    }

    #[test]
    fn planned_dish_ids_keep_repeats() {
        let soup = Uuid::new_v4();
        let plans = vec![
            plan(date!(2026 - 03 - 01), Some(soup), Some(soup)),
            plan(date!(2026 - 03 - 02), None, Some(soup)),
        ];
        assert_eq!(planned_dish_ids(&plans), vec![soup, soup, soup]);
    }
}
