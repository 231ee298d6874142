use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{AdjustRequest, AlertQuery, StockDraft, StockItemRequest, StockItemResponse},
    repo,
    repo_types::StockItem,
    services::{adjust, alerts_for, summarize, StockAlert, StockSummary, DEFAULT_EXPIRY_WINDOW_DAYS},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    params::parse_date,
    state::AppState,
};

pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(list_stock).post(create_stock))
        .route("/stock/alerts", get(stock_alerts))
        .route("/stock/summary", get(stock_summary))
        .route(
            "/stock/:id",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
        .route("/stock/:id/adjust", post(adjust_stock))
}

fn draft_from(body: StockItemRequest) -> AppResult<StockDraft> {
    let expiration = body.expiration_date.as_deref().map(parse_date).transpose()?;
    StockDraft::validate(body, expiration).map_err(|e| {
        warn!(error = %e, "stock item rejected");
        AppError::BadRequest(e)
    })
}

/// Window in days for expiry alerts, 0..=365.
pub(crate) fn expiry_window(q: &AlertQuery) -> AppResult<i64> {
    match q.days {
        None => Ok(DEFAULT_EXPIRY_WINDOW_DAYS),
        Some(d) if (0..=365).contains(&d) => Ok(d),
        Some(_) => Err(AppError::bad_request("days must be between 0 and 365")),
    }
}

/// Flattens per-item alerts, most urgent stock first.
pub(crate) fn collect_alerts(items: &[StockItem], window: i64) -> Vec<StockAlert> {
    let today = OffsetDateTime::now_utc().date();
    let mut alerts: Vec<StockAlert> = items
        .iter()
        .flat_map(|item| alerts_for(item, today, window))
        .collect();
    alerts.sort_by(|a, b| a.status.cmp(&b.status).then_with(|| a.name.cmp(&b.name)));
    alerts
}

#[instrument(skip(state))]
pub async fn list_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<StockItemResponse>>> {
    let items = repo::list_by_owner(&state.db, user_id).await?;
    Ok(Json(items.into_iter().map(StockItemResponse::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<StockItemRequest>,
) -> AppResult<(StatusCode, Json<StockItemResponse>)> {
    let draft = draft_from(body)?;
    let item = repo::insert(&state.db, user_id, &draft).await?;
    info!(%user_id, item_id = %item.id, "stock item created");
    Ok((StatusCode::CREATED, Json(item.into())))
}

#[instrument(skip(state))]
pub async fn get_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<StockItemResponse>> {
    let item = repo::find(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("Stock item"))?;
    Ok(Json(item.into()))
}

#[instrument(skip(state, body))]
pub async fn update_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StockItemRequest>,
) -> AppResult<Json<StockItemResponse>> {
    let draft = draft_from(body)?;
    let item = repo::update(&state.db, user_id, id, &draft)
        .await?
        .ok_or(AppError::NotFound("Stock item"))?;
    info!(%user_id, item_id = %id, "stock item updated");
    Ok(Json(item.into()))
}

#[instrument(skip(state))]
pub async fn delete_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("Stock item"));
    }
    info!(%user_id, item_id = %id, "stock item deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn adjust_stock(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AdjustRequest>,
) -> AppResult<Json<StockItemResponse>> {
    if !body.delta.is_finite() {
        return Err(AppError::bad_request("delta must be a number"));
    }
    let delta = body.delta;
    let item = repo::adjust_current(&state.db, user_id, id, |current| adjust(current, delta))
        .await?
        .ok_or(AppError::NotFound("Stock item"))?;
    info!(%user_id, item_id = %id, delta, current = item.current_stock, "stock adjusted");
    Ok(Json(item.into()))
}

#[instrument(skip(state))]
pub async fn stock_alerts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<AlertQuery>,
) -> AppResult<Json<Vec<StockAlert>>> {
    let window = expiry_window(&q)?;
    let items = repo::list_by_owner(&state.db, user_id).await?;
    Ok(Json(collect_alerts(&items, window)))
}

#[instrument(skip(state))]
pub async fn stock_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<StockSummary>> {
    let items = repo::list_by_owner(&state.db, user_id).await?;
    Ok(Json(summarize(&items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn item(name: &str, current: f64, expires_in: Option<i64>) -> StockItem {
        let now = OffsetDateTime::now_utc();
        StockItem {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: name.into(),
            category: "Pantry".into(),
            current_stock: current,
            min_stock: 10.0,
            max_stock: 50.0,
            unit: "kg".into(),
            unit_cost: 1.0,
            supplier: None,
            daily_consumption: 0.0,
            weekly_consumption: 0.0,
            expiration_date: expires_in.map(|d| now.date() + Duration::days(d)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn expiry_window_defaults_and_bounds() {
        assert_eq!(expiry_window(&AlertQuery { days: None }).unwrap(), DEFAULT_EXPIRY_WINDOW_DAYS);
        assert_eq!(expiry_window(&AlertQuery { days: Some(30) }).unwrap(), 30);
        assert!(expiry_window(&AlertQuery { days: Some(-1) }).is_err());
        assert!(expiry_window(&AlertQuery { days: Some(400) }).is_err());
    }

    #[test]
    fn alerts_put_critical_first() {
        let items = vec![item("Beans", 5.0, None), item("Flour", 0.0, None), item("Oil", 20.0, None)];
        let alerts = collect_alerts(&items, 7);
        let names: Vec<_> = alerts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Flour", "Beans"]);
    }

    #[test]
    fn expiry_outside_window_is_quiet() {
        let items = vec![item("Milk", 20.0, Some(10))];
        assert!(collect_alerts(&items, 7).is_empty());
        assert_eq!(collect_alerts(&items, 14).len(), 1);
    }

    #[test]
    fn bad_expiration_date_is_rejected() {
        let body = StockItemRequest {
            name: "Milk".into(),
            category: "Dairy".into(),
            current_stock: 1.0,
            min_stock: 1.0,
            max_stock: 2.0,
            unit: "l".into(),
            unit_cost: 1.0,
            supplier: None,
            daily_consumption: 0.0,
            weekly_consumption: 0.0,
            expiration_date: Some("next week".into()),
        };
        assert!(matches!(draft_from(body), Err(AppError::BadRequest(_))));
    }
}
