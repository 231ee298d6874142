use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        AddItemRequest, CreateListRequest, GenerateListRequest, ListDetails, ListSummary,
        PatchItemRequest,
    },
    repo::{self, NewList},
    repo_types::{ShoppingItem, ShoppingList},
    services::{
        aggregate_ingredients, apply_item_patch, lookup, price_items, render_text, round_cents,
        UNCATEGORIZED,
    },
};
use crate::{
    auth::{repo_types::User, AuthUser},
    dishes::{self, repo_types::Dish},
    error::{AppError, AppResult},
    ingredients,
    meal_plans::{self, services::{planned_dish_ids, MAX_RANGE_DAYS}},
    params::{check_range, parse_date, Pagination},
    profile::services::validate_household,
    state::AppState,
};

pub fn shopping_routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-lists", get(list_lists).post(create_list))
        .route("/shopping-lists/generate", post(generate_list))
        .route("/shopping-lists/:id", get(get_list).delete(delete_list))
        .route("/shopping-lists/:id/items", post(add_item))
        .route(
            "/shopping-lists/:id/items/:index",
            patch(patch_item).delete(remove_item),
        )
        .route("/shopping-lists/:id/export", get(export_list))
}

fn check_budget(budget: Option<f64>) -> AppResult<Option<f64>> {
    match budget {
        Some(b) if !b.is_finite() || b < 0.0 => Err(AppError::bad_request("Budget must be non-negative")),
        other => Ok(other),
    }
}

async fn household_for(state: &AppState, user_id: Uuid, requested: Option<i32>) -> AppResult<i32> {
    if let Some(size) = requested {
        return validate_household(size).map_err(AppError::BadRequest);
    }
    let profile = User::find_by_id(&state.db, user_id).await?;
    Ok(profile.and_then(|u| u.household_size).unwrap_or(1))
}

async fn load_list(state: &AppState, user_id: Uuid, id: Uuid) -> AppResult<ShoppingList> {
    repo::find(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Shopping list"))
}

#[instrument(skip(state))]
pub async fn list_lists(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> AppResult<Json<Vec<ListSummary>>> {
    let (limit, offset) = p.clamped();
    let lists = repo::list_by_owner(&state.db, user_id, limit, offset).await?;
    Ok(Json(lists.into_iter().map(ListSummary::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateListRequest>,
) -> AppResult<(StatusCode, Json<ListDetails>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("List name is required"));
    }
    let start_date = parse_date(&body.start_date)?;
    let end_date = parse_date(&body.end_date)?;
    check_range(start_date, end_date, MAX_RANGE_DAYS)?;
    let budget = check_budget(body.budget)?;
    let household_size = household_for(&state, user_id, body.household_size).await?;

    let list = repo::insert(
        &state.db,
        user_id,
        NewList {
            name,
            start_date,
            end_date,
            household_size,
            items: &[],
            budget,
        },
    )
    .await?;
    info!(%user_id, list_id = %list.id, "shopping list created");
    Ok((StatusCode::CREATED, Json(list.into())))
}

/// Build a list from the meal plans in the date range.
#[instrument(skip(state, body))]
pub async fn generate_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GenerateListRequest>,
) -> AppResult<(StatusCode, Json<ListDetails>)> {
    let start_date = parse_date(&body.start_date)?;
    let end_date = parse_date(&body.end_date)?;
    check_range(start_date, end_date, MAX_RANGE_DAYS)?;
    let budget = check_budget(body.budget)?;
    let household_size = household_for(&state, user_id, body.household_size).await?;

    let plans = meal_plans::repo::list_range(&state.db, user_id, start_date, end_date).await?;
    let occurrences = planned_dish_ids(&plans);
    if occurrences.is_empty() {
        warn!(%user_id, %start_date, %end_date, "no meals planned in range");
        return Err(AppError::bad_request("No meals planned in this date range"));
    }

    let mut unique = occurrences.clone();
    unique.sort();
    unique.dedup();
    let by_id: HashMap<Uuid, Dish> = dishes::repo::find_many(&state.db, &unique)
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();

    let aggregated = aggregate_ingredients(
        occurrences.iter().filter_map(|id| by_id.get(id)),
        household_size,
    );
    let names: Vec<String> = aggregated.iter().map(|a| a.name.clone()).collect();
    let catalog = ingredients::repo::find_by_names(&state.db, &names).await?;
    let items = price_items(aggregated, &catalog);

    let default_name = format!("Groceries {} to {}", start_date, end_date);
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&default_name);

    let list = repo::insert(
        &state.db,
        user_id,
        NewList {
            name,
            start_date,
            end_date,
            household_size,
            items: &items,
            budget,
        },
    )
    .await?;
    info!(
        %user_id,
        list_id = %list.id,
        meals = occurrences.len(),
        items = items.len(),
        "shopping list generated"
    );
    Ok((StatusCode::CREATED, Json(list.into())))
}

#[instrument(skip(state))]
pub async fn get_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ListDetails>> {
    Ok(Json(load_list(&state, user_id, id).await?.into()))
}

#[instrument(skip(state))]
pub async fn delete_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Shopping list"));
    }
    info!(%user_id, list_id = %id, "shopping list deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn add_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddItemRequest>,
) -> AppResult<(StatusCode, Json<ListDetails>)> {
    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::bad_request("Item name is required"));
    }
    if !body.quantity.is_finite() || body.quantity <= 0.0 {
        return Err(AppError::bad_request("Quantity must be positive"));
    }
    if matches!(body.estimated_price, Some(p) if !p.is_finite() || p < 0.0) {
        return Err(AppError::bad_request("Price must be non-negative"));
    }

    let mut list = load_list(&state, user_id, id).await?;

    let catalog = ingredients::repo::find_by_names(&state.db, std::slice::from_ref(&name)).await?;
    let known = lookup(&catalog, &name);
    let category = body
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .or_else(|| known.map(|k| k.category.clone()))
        .unwrap_or_else(|| UNCATEGORIZED.to_string());
    let price = body
        .estimated_price
        .or_else(|| known.map(|k| body.quantity * k.price_per_unit))
        .map(round_cents)
        .unwrap_or(0.0);

    list.items
        .0
        .push(ShoppingItem::new(name, body.quantity, body.unit.trim(), category).with_price(price));
    let list = repo::replace_items(&state.db, user_id, id, &list.items.0)
        .await?
        .ok_or(AppError::NotFound("Shopping list"))?;
    info!(%user_id, list_id = %id, "shopping item added");
    Ok((StatusCode::CREATED, Json(list.into())))
}

/// Parse a PATCH body; an empty body means "toggle purchased".
fn parse_patch(body: &[u8]) -> AppResult<PatchItemRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PatchItemRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "malformed item patch");
        AppError::bad_request(format!("Invalid JSON body: {}", e))
    })
}

#[instrument(skip(state, body))]
pub async fn patch_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, index)): Path<(Uuid, usize)>,
    body: Bytes,
) -> AppResult<Json<ListDetails>> {
    let body = parse_patch(&body)?;
    let mut list = load_list(&state, user_id, id).await?;
    let item = list
        .items
        .0
        .get_mut(index)
        .ok_or(AppError::NotFound("Shopping item"))?;
    apply_item_patch(item, body.purchased, body.quantity).map_err(AppError::BadRequest)?;
    let purchased = item.purchased;

    let list = repo::replace_items(&state.db, user_id, id, &list.items.0)
        .await?
        .ok_or(AppError::NotFound("Shopping list"))?;
    info!(%user_id, list_id = %id, index, purchased, "shopping item updated");
    Ok(Json(list.into()))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, index)): Path<(Uuid, usize)>,
) -> AppResult<Json<ListDetails>> {
    let mut list = load_list(&state, user_id, id).await?;
    if index >= list.items.0.len() {
        return Err(AppError::NotFound("Shopping item"));
    }
    let removed = list.items.0.remove(index);
    let list = repo::replace_items(&state.db, user_id, id, &list.items.0)
        .await?
        .ok_or(AppError::NotFound("Shopping list"))?;
    info!(%user_id, list_id = %id, item = %removed.name, "shopping item removed");
    Ok(Json(list.into()))
}

/// Plain-text export grouped by category.
#[instrument(skip(state))]
pub async fn export_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let list = load_list(&state, user_id, id).await?;
    let filename = format!("attachment; filename=\"shopping-list-{}.txt\"", list.id);
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        render_text(&list),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_patch_body_is_a_toggle() {
        for body in [&b""[..], b"  \n"] {
            let p = parse_patch(body).unwrap();
            assert_eq!((p.purchased, p.quantity), (None, None));
        }
    }

    #[test]
    fn quantity_patch_body_parses() {
        let p = parse_patch(br#"{"quantity": 3}"#).unwrap();
        assert_eq!((p.purchased, p.quantity), (None, Some(3.0)));
    }

    #[test]
    fn malformed_patch_body_is_rejected() {
        let err = parse_patch(b"{quantity: ").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
