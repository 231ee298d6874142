use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::MarketRequest, repo_types::Market};

const MARKET_COLUMNS: &str = "id, name, address, latitude, longitude, opening_hours, created_at";

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Market>> {
    let rows = sqlx::query_as::<_, Market>(&format!(
        "SELECT {MARKET_COLUMNS} FROM markets ORDER BY name ASC"
    ))
    .fetch_all(db)
    .await
    .context("list markets")?;
    Ok(rows)
}

/// Rough bounding box prefilter; exact distance is computed afterwards.
pub async fn list_in_box(
    db: &PgPool,
    lat_min: f64,
    lat_max: f64,
    lng_min: f64,
    lng_max: f64,
) -> anyhow::Result<Vec<Market>> {
    let rows = sqlx::query_as::<_, Market>(&format!(
        r#"
        SELECT {MARKET_COLUMNS} FROM markets
         WHERE latitude BETWEEN $1 AND $2
           AND longitude BETWEEN $3 AND $4
        "#
    ))
    .bind(lat_min)
    .bind(lat_max)
    .bind(lng_min)
    .bind(lng_max)
    .fetch_all(db)
    .await
    .context("list markets in box")?;
    Ok(rows)
}

pub(super) async fn insert(db: &PgPool, m: &MarketRequest) -> anyhow::Result<Market> {
    let row = sqlx::query_as::<_, Market>(&format!(
        r#"
        INSERT INTO markets (name, address, latitude, longitude, opening_hours)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {MARKET_COLUMNS}
        "#
    ))
    .bind(&m.name)
    .bind(&m.address)
    .bind(m.latitude)
    .bind(m.longitude)
    .bind(&m.opening_hours)
    .fetch_one(db)
    .await
    .context("insert market")?;
    Ok(row)
}

pub(super) async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM markets WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete market")?;
    Ok(res.rows_affected() > 0)
}
