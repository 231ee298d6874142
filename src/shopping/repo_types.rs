use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    pub category: String,
    #[serde(default)]
    pub estimated_price: f64,
    #[serde(default)]
    pub purchased: bool,
}

impl ShoppingItem {
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
            category: category.into(),
            estimated_price: 0.0,
            purchased: false,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.estimated_price = price;
        self
    }
}

/// Shopping list record; items are stored inline as a JSON array.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShoppingList {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub household_size: i32,
    pub items: Json<Vec<ShoppingItem>>,
    pub budget: Option<f64>,
    pub created_at: OffsetDateTime,
}
