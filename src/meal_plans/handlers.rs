use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use std::collections::HashMap;
use time::Date;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{DayPlanResponse, RangeQuery, SetSlotRequest, WeekQuery},
    repo,
    repo_types::MealPlan,
    services::{planned_dish_ids, week_days, week_end, MealSlot, MAX_RANGE_DAYS},
};
use crate::{
    auth::AuthUser,
    dishes::{self, repo_types::Dish},
    error::{AppError, AppResult},
    params::{check_range, parse_date},
    state::AppState,
};

pub fn meal_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_range))
        .route("/meal-plans/week", get(get_week))
        .route("/meal-plans/:date", get(get_day).delete(clear_day))
        .route("/meal-plans/:date/:slot", put(set_slot).delete(clear_slot))
}

fn parse_slot(raw: &str) -> AppResult<MealSlot> {
    raw.parse::<MealSlot>().map_err(AppError::BadRequest)
}

async fn dishes_for(state: &AppState, plans: &[MealPlan]) -> AppResult<HashMap<Uuid, Dish>> {
    let mut ids = planned_dish_ids(plans);
    ids.sort();
    ids.dedup();
    let dishes = dishes::repo::find_many(&state.db, &ids).await?;
    Ok(dishes.into_iter().map(|d| (d.id, d)).collect())
}

async fn day_response(
    state: &AppState,
    date: Date,
    plan: Option<MealPlan>,
) -> AppResult<DayPlanResponse> {
    let plans: Vec<MealPlan> = plan.into_iter().collect();
    let dishes = dishes_for(state, &plans).await?;
    Ok(DayPlanResponse::build(date, plans.first(), &dishes))
}

/// GET /meal-plans?from=YYYY-MM-DD&to=YYYY-MM-DD (planned days only)
#[instrument(skip(state))]
pub async fn list_range(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<RangeQuery>,
) -> AppResult<Json<Vec<DayPlanResponse>>> {
    let start = parse_date(&q.from)?;
    let end = parse_date(&q.to)?;
    check_range(start, end, MAX_RANGE_DAYS)?;

    let plans = repo::list_range(&state.db, user_id, start, end).await?;
    let dishes = dishes_for(&state, &plans).await?;
    let days = plans
        .iter()
        .map(|p| DayPlanResponse::build(p.date, Some(p), &dishes))
        .collect();
    Ok(Json(days))
}

/// GET /meal-plans/week?start=YYYY-MM-DD (always seven days)
#[instrument(skip(state))]
pub async fn get_week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeekQuery>,
) -> AppResult<Json<Vec<DayPlanResponse>>> {
    let start = parse_date(&q.start)?;
    let end = week_end(start).ok_or_else(|| {
        warn!(%user_id, %start, "week runs past the calendar");
        AppError::bad_request("Week start is too late in the calendar")
    })?;
    let plans = repo::list_range(&state.db, user_id, start, end).await?;
    let dishes = dishes_for(&state, &plans).await?;
    let days = week_days(start, &plans)
        .into_iter()
        .map(|(date, plan)| DayPlanResponse::build(date, plan, &dishes))
        .collect();
    Ok(Json(days))
}

#[instrument(skip(state))]
pub async fn get_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> AppResult<Json<DayPlanResponse>> {
    let date = parse_date(&date)?;
    let plan = repo::find(&state.db, user_id, date).await?;
    Ok(Json(day_response(&state, date, plan).await?))
}

#[instrument(skip(state))]
pub async fn clear_day(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> AppResult<StatusCode> {
    let date = parse_date(&date)?;
    if !repo::delete_day(&state.db, user_id, date).await? {
        return Err(AppError::NotFound("Meal plan"));
    }
    info!(%user_id, %date, "meal plan day cleared");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn set_slot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, slot)): Path<(String, String)>,
    Json(body): Json<SetSlotRequest>,
) -> AppResult<Json<DayPlanResponse>> {
    let date = parse_date(&date)?;
    let slot = parse_slot(&slot)?;

    match dishes::repo::find(&state.db, body.dish_id).await? {
        Some(d) if d.approved || d.owner_id == user_id => {}
        _ => return Err(AppError::NotFound("Dish")),
    }

    let plan = repo::set_slot(&state.db, user_id, date, slot, body.dish_id).await?;
    info!(%user_id, %date, %slot, dish_id = %body.dish_id, "meal slot planned");
    Ok(Json(day_response(&state, date, Some(plan)).await?))
}

#[instrument(skip(state))]
pub async fn clear_slot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((date, slot)): Path<(String, String)>,
) -> AppResult<Json<DayPlanResponse>> {
    let date = parse_date(&date)?;
    let slot = parse_slot(&slot)?;
    let remaining = repo::clear_slot(&state.db, user_id, date, slot).await?;
    info!(%user_id, %date, %slot, "meal slot cleared");
    Ok(Json(day_response(&state, date, remaining).await?))
}
