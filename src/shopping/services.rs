//! Shopping-list derivations: ingredient aggregation from planned dishes,
//! catalog pricing, category grouping, budget totals and text export.
//!
//! All functions here are pure and run over small in-memory slices.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;

use super::repo_types::{ShoppingItem, ShoppingList};
use crate::dishes::repo_types::Dish;
use crate::ingredients::repo_types::Ingredient;

pub const UNCATEGORIZED: &str = "Other";

/// Items of one category, in the order they appear in the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub items: Vec<IndexedItem>,
    pub subtotal: f64,
}

/// An item plus its position in the list, which item operations address.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexedItem {
    pub index: usize,
    #[serde(flatten)]
    pub item: ShoppingItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetTotals {
    pub item_count: usize,
    pub purchased_count: usize,
    pub total_estimated: f64,
    pub purchased_total: f64,
    pub remaining_total: f64,
    pub budget: Option<f64>,
    pub over_budget: Option<bool>,
}

/// An ingredient summed over every planned dish occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

pub fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Partition items into category buckets. Buckets appear in order of first
/// occurrence and keep the items' relative order.
pub fn group_by_category(items: &[ShoppingItem]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        let pos = *slot.entry(item.category.as_str()).or_insert_with(|| {
            groups.push(CategoryGroup {
                category: item.category.clone(),
                items: Vec::new(),
                subtotal: 0.0,
            });
            groups.len() - 1
        });
        let group = &mut groups[pos];
        group.subtotal = round_cents(group.subtotal + item.estimated_price);
        group.items.push(IndexedItem {
            index,
            item: item.clone(),
        });
    }
    groups
}

pub fn totals(items: &[ShoppingItem], budget: Option<f64>) -> BudgetTotals {
    let total: f64 = items.iter().map(|i| i.estimated_price).sum();
    let purchased: f64 = items
        .iter()
        .filter(|i| i.purchased)
        .map(|i| i.estimated_price)
        .sum();
    let total_estimated = round_cents(total);
    BudgetTotals {
        item_count: items.len(),
        purchased_count: items.iter().filter(|i| i.purchased).count(),
        total_estimated,
        purchased_total: round_cents(purchased),
        remaining_total: round_cents(total - purchased),
        budget,
        over_budget: budget.map(|b| total_estimated > b),
    }
}

/// Sum ingredients over every dish occurrence, scaled from the dish's servings
/// to the household size. Same name (case-insensitive) and unit merge.
pub fn aggregate_ingredients<'a>(
    dishes: impl IntoIterator<Item = &'a Dish>,
    household_size: i32,
) -> Vec<AggregatedIngredient> {
    let mut out: Vec<AggregatedIngredient> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    for dish in dishes {
        let servings = dish.servings.max(1) as f64;
        let factor = household_size.max(1) as f64 / servings;
        for ing in dish.ingredients.0.iter() {
            let key = (ing.name.to_lowercase(), ing.unit.to_lowercase());
            let qty = ing.quantity * factor;
            match index.get(&key) {
                Some(&pos) => out[pos].quantity += qty,
                None => {
                    index.insert(key, out.len());
                    out.push(AggregatedIngredient {
                        name: ing.name.clone(),
                        quantity: qty,
                        unit: ing.unit.clone(),
                    });
                }
            }
        }
    }
    for a in &mut out {
        a.quantity = round_cents(a.quantity);
    }
    out
}

/// Category and price per unit for a name, from the catalog.
pub fn lookup<'a>(catalog: &'a [Ingredient], name: &str) -> Option<&'a Ingredient> {
    let lower = name.to_lowercase();
    catalog.iter().find(|c| c.name.to_lowercase() == lower)
}

pub fn price_items(aggregated: Vec<AggregatedIngredient>, catalog: &[Ingredient]) -> Vec<ShoppingItem> {
    aggregated
        .into_iter()
        .map(|a| match lookup(catalog, &a.name) {
            Some(c) => {
                let price = round_cents(a.quantity * c.price_per_unit);
                ShoppingItem::new(a.name, a.quantity, a.unit, c.category.clone()).with_price(price)
            }
            None => ShoppingItem::new(a.name, a.quantity, a.unit, UNCATEGORIZED),
        })
        .collect()
}

/// Apply an item edit. A new quantity rescales the price at the same unit
/// price. With no fields at all the purchased flag is toggled; otherwise the
/// flag only changes when `purchased` is given.
pub fn apply_item_patch(
    item: &mut ShoppingItem,
    purchased: Option<bool>,
    quantity: Option<f64>,
) -> Result<(), String> {
    if let Some(q) = quantity {
        if !q.is_finite() || q <= 0.0 {
            return Err("Quantity must be positive".into());
        }
        if item.quantity > 0.0 {
            item.estimated_price = round_cents(item.estimated_price / item.quantity * q);
        }
        item.quantity = q;
    }
    match (purchased, quantity) {
        (Some(p), _) => item.purchased = p,
        (None, None) => item.purchased = !item.purchased,
        (None, Some(_)) => {}
    }
    Ok(())
}

/// Plain-text rendering grouped by category.
pub fn render_text(list: &ShoppingList) -> String {
    let items = &list.items.0;
    let mut out = String::new();
    let _ = writeln!(out, "{}", list.name);
    let _ = writeln!(out, "{}", "=".repeat(list.name.chars().count()));
    let _ = writeln!(
        out,
        "{} to {} | household of {}",
        list.start_date, list.end_date, list.household_size
    );
    for group in group_by_category(items) {
        let _ = writeln!(out, "\n{} ({:.2})", group.category, group.subtotal);
        for IndexedItem { item, .. } in group.items {
            let check = if item.purchased { "[x]" } else { "[ ]" };
            let qty = if item.unit.is_empty() {
                format!("{}", item.quantity)
            } else {
                format!("{} {}", item.quantity, item.unit)
            };
            let _ = writeln!(
                out,
                "{} {:<24} {:>10} {:>8.2}",
                check, item.name, qty, item.estimated_price
            );
        }
    }
    let t = totals(items, list.budget);
    let _ = writeln!(out, "\nTotal: {:.2}", t.total_estimated);
    let _ = writeln!(out, "Purchased: {:.2}", t.purchased_total);
    let _ = writeln!(out, "Remaining: {:.2}", t.remaining_total);
    if let Some(b) = t.budget {
        let _ = writeln!(out, "Budget: {:.2}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dishes::repo_types::{DietaryFlags, DishIngredient, Nutrition};
    use sqlx::types::Json;
    use time::{macros::date, OffsetDateTime};
    use uuid::Uuid;

    fn item(name: &str, category: &str, price: f64) -> ShoppingItem {
        ShoppingItem::new(name, 1.0, "", category).with_price(price)
    }

    #[test]
    fn patch_with_only_quantity_keeps_purchased_flag() {
        let mut milk = ShoppingItem::new("milk", 2.0, "l", "Dairy").with_price(3.0);
        milk.purchased = true;
        apply_item_patch(&mut milk, None, Some(3.0)).unwrap();
        assert!(milk.purchased);
        assert_eq!(milk.quantity, 3.0);
        assert_eq!(milk.estimated_price, 4.5);
    }

    #[test]
    fn empty_patch_toggles_purchased() {
        let mut bread = item("bread", "Bakery", 2.0);
        apply_item_patch(&mut bread, None, None).unwrap();
        assert!(bread.purchased);
        apply_item_patch(&mut bread, None, None).unwrap();
        assert!(!bread.purchased);
    }

    #[test]
    fn explicit_purchased_is_set_not_toggled() {
        let mut eggs = item("eggs", "Dairy", 2.5);
        apply_item_patch(&mut eggs, Some(false), None).unwrap();
        assert!(!eggs.purchased);
        apply_item_patch(&mut eggs, Some(true), Some(12.0)).unwrap();
        assert!(eggs.purchased);
        assert_eq!(eggs.quantity, 12.0);
    }

    #[test]
    fn patch_rejects_non_positive_quantity_untouched() {
        let mut rice = item("rice", "Grains", 1.0);
        assert!(apply_item_patch(&mut rice, Some(true), Some(0.0)).is_err());
        assert!(!rice.purchased);
        assert_eq!(rice.quantity, 1.0);
    }

    fn dish(servings: i32, ingredients: Vec<DishIngredient>) -> Dish {
        Dish {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            name: "dish".into(),
            category: "Main".into(),
            prep_time: 10,
            servings,
            difficulty: "easy".into(),
            nutrition: Json(Nutrition::default()),
            dietary: Json(DietaryFlags::default()),
            ingredients: Json(ingredients),
            instructions: String::new(),
            image_key: None,
            approved: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    fn catalog(name: &str, category: &str, price: f64) -> Ingredient {
        Ingredient {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            unit: String::new(),
            price_per_unit: price,
        }
    }

    #[test]
    fn groups_in_first_appearance_order() {
        let items = vec![
            item("apple", "Fruits", 1.0),
            item("milk", "Dairy", 2.0),
            item("pear", "Fruits", 1.5),
        ];
        let groups = group_by_category(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Fruits");
        let fruit: Vec<&str> = groups[0].items.iter().map(|i| i.item.name.as_str()).collect();
        assert_eq!(fruit, vec!["apple", "pear"]);
        assert_eq!(groups[0].items[1].index, 2);
        assert_eq!(groups[0].subtotal, 2.5);
        assert_eq!(groups[1].category, "Dairy");
        assert_eq!(groups[1].items[0].item.name, "milk");
    }

    #[test]
    fn grouping_is_a_partition() {
        let cats = ["Produce", "Dairy", "Bakery", "Produce", "Meat", "Dairy", "Other"];
        let items: Vec<ShoppingItem> = cats
            .iter()
            .enumerate()
            .map(|(i, c)| item(&format!("item{}", i), c, 1.0))
            .collect();
        let groups = group_by_category(&items);
        let total: usize = groups.iter().map(|g| g.items.len()).sum();
        assert_eq!(total, items.len());

        let mut seen: Vec<usize> = groups
            .iter()
            .flat_map(|g| g.items.iter().map(|i| i.index))
            .collect();
        seen.sort();
        assert_eq!(seen, (0..items.len()).collect::<Vec<_>>());
        for g in &groups {
            assert!(g.items.iter().all(|i| i.item.category == g.category));
        }
    }

    #[test]
    fn empty_list_has_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }

    #[test]
    fn totals_split_purchased_and_remaining() {
        let mut items = vec![
            item("apple", "Fruits", 1.10),
            item("milk", "Dairy", 2.25),
            item("bread", "Bakery", 3.00),
        ];
        items[1].purchased = true;
        let t = totals(&items, Some(5.0));
        assert_eq!(t.item_count, 3);
        assert_eq!(t.purchased_count, 1);
        assert_eq!(t.total_estimated, 6.35);
        assert_eq!(t.purchased_total, 2.25);
        assert_eq!(t.remaining_total, 4.1);
        assert_eq!(t.over_budget, Some(true));
        assert_eq!(totals(&items, None).over_budget, None);
    }

    #[test]
    fn aggregation_merges_and_scales_by_household() {
        let pasta = dish(
            2,
            vec![
                DishIngredient::new("Tomato", 2.0, "pcs"),
                DishIngredient::new("pasta", 200.0, "g"),
            ],
        );
        let salad = dish(4, vec![DishIngredient::new("tomato", 4.0, "PCS")]);
        // pasta planned twice, household of 4
        let agg = aggregate_ingredients([&pasta, &pasta, &salad], 4);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].name, "Tomato");
        assert_eq!(agg[0].quantity, 2.0 * 2.0 * 2.0 + 4.0);
        assert_eq!(agg[1].name, "pasta");
        assert_eq!(agg[1].quantity, 800.0);
    }

    #[test]
    fn aggregation_keeps_different_units_apart() {
        let d = dish(
            1,
            vec![
                DishIngredient::new("milk", 1.0, "l"),
                DishIngredient::new("milk", 200.0, "ml"),
            ],
        );
        assert_eq!(aggregate_ingredients([&d], 1).len(), 2);
    }

    #[test]
    fn zero_servings_counts_as_one() {
        let d = dish(0, vec![DishIngredient::new("egg", 2.0, "")]);
        assert_eq!(aggregate_ingredients([&d], 3)[0].quantity, 6.0);
    }

    #[test]
    fn pricing_uses_catalog_or_falls_back() {
        let agg = vec![
            AggregatedIngredient { name: "Apple".into(), quantity: 3.0, unit: "pcs".into() },
            AggregatedIngredient { name: "saffron".into(), quantity: 1.0, unit: "g".into() },
        ];
        let items = price_items(agg, &[catalog("apple", "Fruits", 0.333)]);
        assert_eq!(items[0].category, "Fruits");
        assert_eq!(items[0].estimated_price, 1.0);
        assert_eq!(items[1].category, UNCATEGORIZED);
        assert_eq!(items[1].estimated_price, 0.0);
        assert!(items.iter().all(|i| !i.purchased));
    }

    #[test]
    fn export_lists_every_item_under_its_category() {
        let mut items = vec![item("apple", "Fruits", 1.0), item("milk", "Dairy", 2.0)];
        items[0].purchased = true;
        let list = ShoppingList {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            name: "Week 10".into(),
            start_date: date!(2026 - 03 - 02),
            end_date: date!(2026 - 03 - 08),
            household_size: 2,
            items: Json(items),
            budget: Some(10.0),
            created_at: OffsetDateTime::now_utc(),
        };
        let text = render_text(&list);
        assert!(text.starts_with("Week 10\n=======\n"));
        assert!(text.contains("Fruits (1.00)"));
        assert!(text.contains("[x] apple"));
        assert!(text.contains("[ ] milk"));
        assert!(text.contains("Total: 3.00"));
        assert!(text.contains("Budget: 10.00"));
    }
}
