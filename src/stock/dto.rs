use serde::{Deserialize, Serialize};
use time::Date;

use super::{
    repo_types::StockItem,
    services::{classify, days_until_empty, reorder_quantity, weekly_rate, StockStatus},
};

/// Body for create and full update. Dates are `YYYY-MM-DD`.
#[derive(Debug, Deserialize)]
pub struct StockItemRequest {
    pub name: String,
    pub category: String,
    pub current_stock: f64,
    pub min_stock: f64,
    pub max_stock: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_cost: f64,
    pub supplier: Option<String>,
    #[serde(default)]
    pub daily_consumption: f64,
    #[serde(default)]
    pub weekly_consumption: f64,
    pub expiration_date: Option<String>,
}

/// Validated stock fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDraft {
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
}

impl StockDraft {
    pub fn validate(r: StockItemRequest, expiration_date: Option<Date>) -> Result<Self, String> {
        let name = r.name.trim().to_string();
        let category = r.category.trim().to_string();
        if name.is_empty() || category.is_empty() {
            return Err("Name and category are required".into());
        }
        let numbers = [
            r.current_stock,
            r.min_stock,
            r.max_stock,
            r.unit_cost,
            r.daily_consumption,
            r.weekly_consumption,
        ];
        if numbers.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err("Stock quantities, rates and costs must be non-negative".into());
        }
        if r.min_stock > r.max_stock {
            return Err("Minimum stock cannot exceed maximum stock".into());
        }
        Ok(Self {
            name,
            category,
            current_stock: r.current_stock,
            min_stock: r.min_stock,
            max_stock: r.max_stock,
            unit: r.unit.trim().to_string(),
            unit_cost: r.unit_cost,
            supplier: r
                .supplier
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            daily_consumption: r.daily_consumption,
            weekly_consumption: r.weekly_consumption,
            expiration_date,
        })
    }
}

/// Positive to restock, negative to consume.
#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub delta: f64,
}

#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct StockItemResponse {
    #[serde(flatten)]
    pub item: StockItem,
    pub status: StockStatus,
    pub days_until_empty: Option<f64>,
    pub reorder_quantity: f64,
}

impl From<StockItem> for StockItemResponse {
    fn from(item: StockItem) -> Self {
        Self {
            status: classify(item.current_stock, item.min_stock, item.max_stock),
            days_until_empty: days_until_empty(item.current_stock, weekly_rate(&item)),
            reorder_quantity: reorder_quantity(&item),
            item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StockItemRequest {
        StockItemRequest {
            name: " Rice ".into(),
            category: "Grains".into(),
            current_stock: 5.0,
            min_stock: 10.0,
            max_stock: 50.0,
            unit: "kg".into(),
            unit_cost: 2.0,
            supplier: Some("  ".into()),
            daily_consumption: 0.0,
            weekly_consumption: 7.0,
            expiration_date: None,
        }
    }

    #[test]
    fn validate_accepts_and_normalizes() {
        let d = StockDraft::validate(request(), None).unwrap();
        assert_eq!(d.name, "Rice");
        assert_eq!(d.supplier, None);
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let mut r = request();
        r.min_stock = 60.0;
        assert!(StockDraft::validate(r, None).is_err());
    }

    #[test]
    fn validate_rejects_negative_numbers() {
        let mut r = request();
        r.unit_cost = -0.5;
        assert!(StockDraft::validate(r, None).is_err());
    }
}
