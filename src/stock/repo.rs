use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::StockDraft, repo_types::StockItem};

const STOCK_COLUMNS: &str = "id, owner_id, name, category, current_stock, min_stock, max_stock, \
     unit, unit_cost, supplier, daily_consumption, weekly_consumption, expiration_date, \
     created_at, updated_at";

pub async fn insert(db: &PgPool, owner_id: Uuid, d: &StockDraft) -> anyhow::Result<StockItem> {
    let row = sqlx::query_as::<_, StockItem>(&format!(
        r#"
        INSERT INTO stock_items (owner_id, name, category, current_stock, min_stock, max_stock,
                                 unit, unit_cost, supplier, daily_consumption, weekly_consumption,
                                 expiration_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(&d.name)
    .bind(&d.category)
    .bind(d.current_stock)
    .bind(d.min_stock)
    .bind(d.max_stock)
    .bind(&d.unit)
    .bind(d.unit_cost)
    .bind(&d.supplier)
    .bind(d.daily_consumption)
    .bind(d.weekly_consumption)
    .bind(d.expiration_date)
    .fetch_one(db)
    .await
    .context("insert stock item")?;
    Ok(row)
}

pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<Vec<StockItem>> {
    let rows = sqlx::query_as::<_, StockItem>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stock_items WHERE owner_id = $1 ORDER BY category ASC, name ASC"
    ))
    .bind(owner_id)
    .fetch_all(db)
    .await
    .context("list stock items")?;
    Ok(rows)
}

/// Every user's stock, for the admin console.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<StockItem>> {
    let rows = sqlx::query_as::<_, StockItem>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stock_items ORDER BY owner_id, name ASC"
    ))
    .fetch_all(db)
    .await
    .context("list all stock items")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<StockItem>> {
    let row = sqlx::query_as::<_, StockItem>(&format!(
        "SELECT {STOCK_COLUMNS} FROM stock_items WHERE id = $1 AND owner_id = $2"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(db)
    .await
    .context("find stock item")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    owner_id: Uuid,
    id: Uuid,
    d: &StockDraft,
) -> anyhow::Result<Option<StockItem>> {
    let row = sqlx::query_as::<_, StockItem>(&format!(
        r#"
        UPDATE stock_items
           SET name = $3, category = $4, current_stock = $5, min_stock = $6, max_stock = $7,
               unit = $8, unit_cost = $9, supplier = $10, daily_consumption = $11,
               weekly_consumption = $12, expiration_date = $13, updated_at = now()
         WHERE id = $1 AND owner_id = $2
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .bind(&d.name)
    .bind(&d.category)
    .bind(d.current_stock)
    .bind(d.min_stock)
    .bind(d.max_stock)
    .bind(&d.unit)
    .bind(d.unit_cost)
    .bind(&d.supplier)
    .bind(d.daily_consumption)
    .bind(d.weekly_consumption)
    .bind(d.expiration_date)
    .fetch_optional(db)
    .await
    .context("update stock item")?;
    Ok(row)
}

/// Lock the row, apply `apply` to its current stock and write the result back,
/// so concurrent adjustments serialize instead of overwriting each other.
pub async fn adjust_current(
    db: &PgPool,
    owner_id: Uuid,
    id: Uuid,
    apply: impl FnOnce(f64) -> f64,
) -> anyhow::Result<Option<StockItem>> {
    let mut tx = db.begin().await.context("begin tx")?;
    let current: Option<f64> = sqlx::query_scalar(
        "SELECT current_stock FROM stock_items WHERE id = $1 AND owner_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(&mut *tx)
    .await
    .context("lock stock item")?;
    let Some(current) = current else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, StockItem>(&format!(
        r#"
        UPDATE stock_items SET current_stock = $3, updated_at = now()
         WHERE id = $1 AND owner_id = $2
        RETURNING {STOCK_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .bind(apply(current))
    .fetch_one(&mut *tx)
    .await
    .context("adjust current stock")?;
    tx.commit().await.context("commit tx")?;
    Ok(Some(row))
}

pub async fn delete(db: &PgPool, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM stock_items WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await
        .context("delete stock item")?;
    Ok(res.rows_affected() > 0)
}
