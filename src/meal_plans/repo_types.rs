use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::services::MealSlot;

/// One calendar day of one user's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MealPlan {
    pub owner_id: Uuid,
    pub date: Date,
    pub breakfast: Option<Uuid>,
    pub lunch: Option<Uuid>,
    pub dinner: Option<Uuid>,
    pub updated_at: OffsetDateTime,
}

impl MealPlan {
    pub fn slot(&self, slot: MealSlot) -> Option<Uuid> {
        match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Dinner => self.dinner,
        }
    }

    /// Dish ids in slot order; a dish planned twice appears twice.
    pub fn dish_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        MealSlot::ALL.iter().filter_map(move |s| self.slot(*s))
    }
}
