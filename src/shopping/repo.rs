use anyhow::Context;
use sqlx::{types::Json, PgPool};
use time::Date;
use uuid::Uuid;

use super::repo_types::{ShoppingItem, ShoppingList};

const LIST_COLUMNS: &str =
    "id, owner_id, name, start_date, end_date, household_size, items, budget, created_at";

pub struct NewList<'a> {
    pub name: &'a str,
    pub start_date: Date,
    pub end_date: Date,
    pub household_size: i32,
    pub items: &'a [ShoppingItem],
    pub budget: Option<f64>,
}

pub async fn insert(db: &PgPool, owner_id: Uuid, l: NewList<'_>) -> anyhow::Result<ShoppingList> {
    let row = sqlx::query_as::<_, ShoppingList>(&format!(
        r#"
        INSERT INTO shopping_lists (owner_id, name, start_date, end_date, household_size, items, budget)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {LIST_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(l.name)
    .bind(l.start_date)
    .bind(l.end_date)
    .bind(l.household_size)
    .bind(Json(l.items))
    .bind(l.budget)
    .fetch_one(db)
    .await
    .context("insert shopping list")?;
    Ok(row)
}

pub async fn list_by_owner(
    db: &PgPool,
    owner_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<ShoppingList>> {
    let rows = sqlx::query_as::<_, ShoppingList>(&format!(
        r#"
        SELECT {LIST_COLUMNS}
          FROM shopping_lists
         WHERE owner_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#
    ))
    .bind(owner_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list shopping lists")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<ShoppingList>> {
    let row = sqlx::query_as::<_, ShoppingList>(&format!(
        "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE id = $1 AND owner_id = $2"
    ))
    .bind(id)
    .bind(owner_id)
    .fetch_optional(db)
    .await
    .context("find shopping list")?;
    Ok(row)
}

/// Overwrite the whole item array (last write wins).
pub async fn replace_items(
    db: &PgPool,
    owner_id: Uuid,
    id: Uuid,
    items: &[ShoppingItem],
) -> anyhow::Result<Option<ShoppingList>> {
    let row = sqlx::query_as::<_, ShoppingList>(&format!(
        r#"
        UPDATE shopping_lists SET items = $3
         WHERE id = $1 AND owner_id = $2
        RETURNING {LIST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(owner_id)
    .bind(Json(items))
    .fetch_optional(db)
    .await
    .context("replace shopping list items")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM shopping_lists WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await
        .context("delete shopping list")?;
    Ok(res.rows_affected() > 0)
}
