use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{
    repo_types::{ShoppingItem, ShoppingList},
    services::{group_by_category, totals, BudgetTotals, CategoryGroup},
};

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub household_size: Option<i32>,
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateListRequest {
    pub name: Option<String>,
    pub start_date: String,
    pub end_date: String,
    /// Defaults to the profile's household size.
    pub household_size: Option<i32>,
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    /// Looked up in the ingredient catalog when absent.
    pub category: Option<String>,
    pub estimated_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchItemRequest {
    /// Flips the flag when absent.
    pub purchased: Option<bool>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ListSummary {
    pub id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub household_size: i32,
    pub totals: BudgetTotals,
    pub created_at: OffsetDateTime,
}

impl From<ShoppingList> for ListSummary {
    fn from(l: ShoppingList) -> Self {
        Self {
            totals: totals(&l.items.0, l.budget),
            id: l.id,
            name: l.name,
            start_date: l.start_date,
            end_date: l.end_date,
            household_size: l.household_size,
            created_at: l.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListDetails {
    pub id: Uuid,
    pub name: String,
    pub start_date: Date,
    pub end_date: Date,
    pub household_size: i32,
    pub items: Vec<ShoppingItem>,
    pub categories: Vec<CategoryGroup>,
    pub totals: BudgetTotals,
    pub created_at: OffsetDateTime,
}

impl From<ShoppingList> for ListDetails {
    fn from(l: ShoppingList) -> Self {
        let items = l.items.0;
        Self {
            categories: group_by_category(&items),
            totals: totals(&items, l.budget),
            items,
            id: l.id,
            name: l.name,
            start_date: l.start_date,
            end_date: l.end_date,
            household_size: l.household_size,
            created_at: l.created_at,
        }
    }
}
