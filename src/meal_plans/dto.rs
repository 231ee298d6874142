use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use time::Date;
use uuid::Uuid;

use super::{repo_types::MealPlan, services::MealSlot};
use crate::dishes::repo_types::Dish;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub start: String,
}

#[derive(Debug, Deserialize)]
pub struct SetSlotRequest {
    pub dish_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotDish {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub calories: f64,
}

impl From<&Dish> for SlotDish {
    fn from(d: &Dish) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            category: d.category.clone(),
            calories: d.nutrition.0.calories,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayPlanResponse {
    pub date: Date,
    pub breakfast: Option<SlotDish>,
    pub lunch: Option<SlotDish>,
    pub dinner: Option<SlotDish>,
    /// Sum of per-serving calories over the filled slots.
    pub total_calories: f64,
}

impl DayPlanResponse {
    pub fn build(date: Date, plan: Option<&MealPlan>, dishes: &HashMap<Uuid, Dish>) -> Self {
        let pick = |slot: MealSlot| {
            plan.and_then(|p| p.slot(slot))
                .and_then(|id| dishes.get(&id))
                .map(SlotDish::from)
        };
        let breakfast = pick(MealSlot::Breakfast);
        let lunch = pick(MealSlot::Lunch);
        let dinner = pick(MealSlot::Dinner);
        let total_calories = [&breakfast, &lunch, &dinner]
            .iter()
            .filter_map(|s| s.as_ref().map(|d| d.calories))
            .sum();
        Self {
            date,
            breakfast,
            lunch,
            dinner,
            total_calories,
        }
    }
}
