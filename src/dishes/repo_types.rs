use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Per-serving nutrition facts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietaryFlags {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishIngredient {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

#[cfg(test)]
impl DishIngredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

/// Dish record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dish {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub category: String,
    pub prep_time: i32, // minutes
    pub servings: i32,
    pub difficulty: String,
    pub nutrition: Json<Nutrition>,
    pub dietary: Json<DietaryFlags>,
    pub ingredients: Json<Vec<DishIngredient>>,
    pub instructions: String,
    #[serde(skip_serializing)]
    pub image_key: Option<String>,
    pub approved: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
