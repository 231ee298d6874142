use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Inventory record. Status is derived on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StockItem {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub category: String,
    pub current_stock: f64,
    pub min_stock: f64,
    pub max_stock: f64,
    pub unit: String,
    pub unit_cost: f64,
    pub supplier: Option<String>,
    pub daily_consumption: f64,
    pub weekly_consumption: f64,
    pub expiration_date: Option<Date>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
