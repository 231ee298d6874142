use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo_types::{DietaryFlags, Dish, DishIngredient, Nutrition},
    services::{Difficulty, DishDraft},
};
use crate::profile::DietPreference;

/// Body for both create and full edit.
#[derive(Debug, Deserialize)]
pub struct DishRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub prep_time: i32,
    #[serde(default = "default_servings")]
    pub servings: i32,
    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub dietary: DietaryFlags,
    #[serde(default)]
    pub ingredients: Vec<DishIngredient>,
    #[serde(default)]
    pub instructions: String,
}

fn default_servings() -> i32 {
    1
}

fn default_difficulty() -> Difficulty {
    Difficulty::Easy
}

impl From<DishRequest> for DishDraft {
    fn from(r: DishRequest) -> Self {
        DishDraft {
            name: r.name,
            category: r.category,
            prep_time: r.prep_time,
            servings: r.servings,
            difficulty: r.difficulty,
            nutrition: r.nutrition,
            dietary: r.dietary,
            ingredients: r.ingredients,
            instructions: r.instructions,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DishListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub diet: Option<DietPreference>,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub gluten_free: bool,
    #[serde(default)]
    pub dairy_free: bool,
    /// Only the caller's own dishes, approved or not.
    #[serde(default)]
    pub mine: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct DishResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub category: String,
    pub prep_time: i32,
    pub servings: i32,
    pub difficulty: String,
    pub nutrition: Nutrition,
    pub dietary: DietaryFlags,
    pub ingredients: Vec<DishIngredient>,
    pub instructions: String,
    pub has_image: bool,
    pub approved: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<Dish> for DishResponse {
    fn from(d: Dish) -> Self {
        Self {
            id: d.id,
            owner_id: d.owner_id,
            name: d.name,
            category: d.category,
            prep_time: d.prep_time,
            servings: d.servings,
            difficulty: d.difficulty,
            nutrition: d.nutrition.0,
            dietary: d.dietary.0,
            ingredients: d.ingredients.0,
            instructions: d.instructions,
            has_image: d.image_key.is_some(),
            approved: d.approved,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}
