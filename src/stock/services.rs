//! Stock status classification and the alerts derived from it.

use serde::Serialize;
use std::fmt;
use time::Date;
use uuid::Uuid;

use super::repo_types::StockItem;

/// Stockout predictions inside this many days raise an alert.
pub const STOCKOUT_WINDOW_DAYS: f64 = 7.0;
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Low,
    Optimal,
    Overstocked,
}

impl StockStatus {
    pub fn needs_attention(&self) -> bool {
        matches!(self, StockStatus::Critical | StockStatus::Low)
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StockStatus::Critical => "critical",
            StockStatus::Low => "low",
            StockStatus::Optimal => "optimal",
            StockStatus::Overstocked => "overstocked",
        };
        f.write_str(s)
    }
}

/// Four-way threshold rule. Total: every input yields exactly one label.
pub fn classify(current: f64, min: f64, max: f64) -> StockStatus {
    if current <= 0.0 {
        StockStatus::Critical
    } else if current <= min {
        StockStatus::Low
    } else if current > max {
        StockStatus::Overstocked
    } else {
        StockStatus::Optimal
    }
}

/// Weekly rate, falling back to seven times the daily rate.
pub fn weekly_rate(item: &StockItem) -> f64 {
    if item.weekly_consumption > 0.0 {
        item.weekly_consumption
    } else {
        item.daily_consumption * 7.0
    }
}

/// Days until the stock runs out; `None` when nothing is being consumed.
pub fn days_until_empty(current: f64, weekly_rate: f64) -> Option<f64> {
    if weekly_rate <= 0.0 || !weekly_rate.is_finite() {
        return None;
    }
    Some((current.max(0.0) / (weekly_rate / 7.0) * 10.0).round() / 10.0)
}

/// Quantity that brings a low or critical item back to its maximum.
pub fn reorder_quantity(item: &StockItem) -> f64 {
    if classify(item.current_stock, item.min_stock, item.max_stock).needs_attention() {
        (item.max_stock - item.current_stock).max(0.0)
    } else {
        0.0
    }
}

/// Signed days until the expiration date; negative once expired.
pub fn days_until_expiry(expiration: Date, today: Date) -> i64 {
    (expiration - today).whole_days()
}

/// Apply a consume (negative) or restock (positive) delta, clamped at zero.
pub fn adjust(current: f64, delta: f64) -> f64 {
    (current + delta).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Critical,
    LowStock,
    Stockout,
    Expiring,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAlert {
    pub item_id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: AlertKind,
    pub status: StockStatus,
    pub current_stock: f64,
    pub days_until_empty: Option<f64>,
    pub days_until_expiry: Option<i64>,
    pub reorder_quantity: f64,
}

/// All alerts for one item: a status alert, a stockout prediction, and an expiry warning.
pub fn alerts_for(item: &StockItem, today: Date, expiry_window_days: i64) -> Vec<StockAlert> {
    let status = classify(item.current_stock, item.min_stock, item.max_stock);
    let days_empty = days_until_empty(item.current_stock, weekly_rate(item));
    let days_expiry = item.expiration_date.map(|d| days_until_expiry(d, today));
    let alert = |kind| StockAlert {
        item_id: item.id,
        owner_id: item.owner_id,
        name: item.name.clone(),
        kind,
        status,
        current_stock: item.current_stock,
        days_until_empty: days_empty,
        days_until_expiry: days_expiry,
        reorder_quantity: reorder_quantity(item),
    };

    let mut out = Vec::new();
    match status {
        StockStatus::Critical => out.push(alert(AlertKind::Critical)),
        StockStatus::Low => out.push(alert(AlertKind::LowStock)),
        StockStatus::Optimal | StockStatus::Overstocked => {}
    }
    // an empty item is already critical
    if status != StockStatus::Critical
        && days_empty.map_or(false, |d| d <= STOCKOUT_WINDOW_DAYS)
    {
        out.push(alert(AlertKind::Stockout));
    }
    match days_expiry {
        Some(d) if d < 0 => out.push(alert(AlertKind::Expired)),
        Some(d) if d <= expiry_window_days => out.push(alert(AlertKind::Expiring)),
        _ => {}
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StockSummary {
    pub total_items: usize,
    pub critical: usize,
    pub low: usize,
    pub optimal: usize,
    pub overstocked: usize,
    pub inventory_value: f64,
}

pub fn summarize(items: &[StockItem]) -> StockSummary {
    let mut s = StockSummary {
        total_items: items.len(),
        ..Default::default()
    };
    for item in items {
        match classify(item.current_stock, item.min_stock, item.max_stock) {
            StockStatus::Critical => s.critical += 1,
            StockStatus::Low => s.low += 1,
            StockStatus::Optimal => s.optimal += 1,
            StockStatus::Overstocked => s.overstocked += 1,
        }
        s.inventory_value += item.current_stock.max(0.0) * item.unit_cost;
    }
    s.inventory_value = (s.inventory_value * 100.0).round() / 100.0;
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, OffsetDateTime};

    fn item(current: f64, min: f64, max: f64) -> StockItem {
        StockItem {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            name: "rice".into(),
            category: "Grains".into(),
            current_stock: current,
            min_stock: min,
            max_stock: max,
            unit: "kg".into(),
            unit_cost: 2.0,
            supplier: None,
            daily_consumption: 0.0,
            weekly_consumption: 0.0,
            expiration_date: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn empty_stock_is_always_critical() {
        for (min, max) in [(0.0, 0.0), (10.0, 50.0), (100.0, 1.0), (-5.0, -1.0)] {
            assert_eq!(classify(0.0, min, max), StockStatus::Critical);
        }
        assert_eq!(classify(-3.0, 10.0, 50.0), StockStatus::Critical);
    }

    #[test]
    fn classifies_reference_examples() {
        assert_eq!(classify(5.0, 10.0, 50.0), StockStatus::Low);
        assert_eq!(classify(60.0, 10.0, 50.0), StockStatus::Overstocked);
        assert_eq!(classify(30.0, 10.0, 50.0), StockStatus::Optimal);
    }

    #[test]
    fn boundaries_are_inclusive_for_low_and_max() {
        assert_eq!(classify(10.0, 10.0, 50.0), StockStatus::Low);
        assert_eq!(classify(50.0, 10.0, 50.0), StockStatus::Optimal);
        assert_eq!(classify(50.01, 10.0, 50.0), StockStatus::Overstocked);
    }

    #[test]
    fn classification_is_total_and_deterministic() {
        let values = [-1.0, 0.0, 0.5, 1.0, 5.0, 10.0, 49.9, 50.0, 75.0, 1e9];
        for &c in &values {
            for &min in &values {
                for &max in &values {
                    let a = classify(c, min, max);
                    assert_eq!(a, classify(c, min, max));
                    let expected = if c <= 0.0 {
                        StockStatus::Critical
                    } else if c <= min {
                        StockStatus::Low
                    } else if c > max {
                        StockStatus::Overstocked
                    } else {
                        StockStatus::Optimal
                    };
                    assert_eq!(a, expected);
                }
            }
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StockStatus::Overstocked).unwrap(), "\"overstocked\"");
        assert_eq!(StockStatus::Low.to_string(), "low");
    }

    #[test]
    fn stockout_prediction() {
        assert_eq!(days_until_empty(7.0, 7.0), Some(7.0));
        assert_eq!(days_until_empty(3.0, 14.0), Some(1.5));
        assert_eq!(days_until_empty(5.0, 0.0), None);
        assert_eq!(days_until_empty(5.0, -2.0), None);
    }

    #[test]
    fn weekly_rate_falls_back_to_daily() {
        let mut i = item(10.0, 2.0, 20.0);
        i.daily_consumption = 1.5;
        assert_eq!(weekly_rate(&i), 10.5);
        i.weekly_consumption = 4.0;
        assert_eq!(weekly_rate(&i), 4.0);
    }

    #[test]
    fn reorder_only_when_low_or_critical() {
        assert_eq!(reorder_quantity(&item(5.0, 10.0, 50.0)), 45.0);
        assert_eq!(reorder_quantity(&item(0.0, 10.0, 50.0)), 50.0);
        assert_eq!(reorder_quantity(&item(30.0, 10.0, 50.0)), 0.0);
    }

    #[test]
    fn adjust_clamps_at_zero() {
        assert_eq!(adjust(5.0, -8.0), 0.0);
        assert_eq!(adjust(5.0, 2.5), 7.5);
    }

    #[test]
    fn serialized_adjustments_each_count() {
        // two consumes and a restock applied one after another on the locked row
        let end = [-2.0, -2.0, 3.0].iter().fold(5.0, |cur, d| adjust(cur, *d));
        assert_eq!(end, 4.0);
        let drained = [-4.0, -4.0, 1.0].iter().fold(5.0, |cur, d| adjust(cur, *d));
        assert_eq!(drained, 1.0);
    }

    #[test]
    fn stockout_fires_at_exactly_seven_days() {
        let today = date!(2026 - 03 - 10);
        let mut on_edge = item(7.0, 5.0, 50.0);
        on_edge.weekly_consumption = 7.0;
        assert_eq!(days_until_empty(7.0, 7.0), Some(7.0));
        let kinds: Vec<AlertKind> = alerts_for(&on_edge, today, 7).iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Stockout]);

        let mut past_edge = item(7.5, 5.0, 50.0);
        past_edge.weekly_consumption = 7.0;
        assert!(alerts_for(&past_edge, today, 7).is_empty());
    }

    #[test]
    fn alerts_cover_status_stockout_and_expiry() {
        let today = date!(2026 - 03 - 10);

        let mut low = item(5.0, 10.0, 50.0);
        low.weekly_consumption = 14.0;
        low.expiration_date = Some(date!(2026 - 03 - 12));
        let kinds: Vec<AlertKind> = alerts_for(&low, today, 7).iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::LowStock, AlertKind::Stockout, AlertKind::Expiring]);

        let mut empty = item(0.0, 10.0, 50.0);
        empty.weekly_consumption = 14.0;
        empty.expiration_date = Some(date!(2026 - 03 - 01));
        let kinds: Vec<AlertKind> = alerts_for(&empty, today, 7).iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Critical, AlertKind::Expired]);

        let mut fine = item(30.0, 10.0, 50.0);
        fine.weekly_consumption = 7.0;
        fine.expiration_date = Some(date!(2026 - 04 - 30));
        assert!(alerts_for(&fine, today, 7).is_empty());
    }

    #[test]
    fn optimal_item_can_still_predict_stockout() {
        let mut i = item(20.0, 10.0, 50.0);
        i.weekly_consumption = 35.0; // 5 per day
        let alerts = alerts_for(&i, date!(2026 - 03 - 10), 7);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Stockout);
        assert_eq!(alerts[0].days_until_empty, Some(4.0));
    }

    #[test]
    fn summary_counts_and_value() {
        let items = vec![
            item(0.0, 1.0, 10.0),
            item(1.0, 1.0, 10.0),
            item(5.0, 1.0, 10.0),
            item(20.0, 1.0, 10.0),
        ];
        let s = summarize(&items);
        assert_eq!(s.total_items, 4);
        assert_eq!((s.critical, s.low, s.optimal, s.overstocked), (1, 1, 1, 1));
        assert_eq!(s.inventory_value, 52.0);
    }
}
