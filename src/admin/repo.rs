use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::Overview;
use crate::auth::{repo::USER_COLUMNS, repo_types::User};

/// Row counts for the overview. The stock attention count is filled by the caller.
pub async fn counts(db: &PgPool) -> anyhow::Result<Overview> {
    let row = sqlx::query_as::<_, Overview>(
        r#"
        SELECT
            (SELECT count(*) FROM users)                           AS users,
            (SELECT count(*) FROM users WHERE setup_complete)      AS setup_complete,
            (SELECT count(*) FROM dishes)                          AS dishes,
            (SELECT count(*) FROM dishes WHERE NOT approved)       AS pending_dishes,
            (SELECT count(*) FROM meal_plans)                      AS meal_plans,
            (SELECT count(*) FROM shopping_lists)                  AS shopping_lists,
            (SELECT count(*) FROM stock_items)                     AS stock_items
        "#,
    )
    .fetch_one(db)
    .await
    .context("admin overview counts")?;
    Ok(row)
}

pub async fn list_users(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
    let rows = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list users")?;
    Ok(rows)
}

pub async fn set_role(db: &PgPool, id: Uuid, role: &str) -> anyhow::Result<Option<User>> {
    let row = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(id)
    .bind(role)
    .fetch_optional(db)
    .await
    .context("set user role")?;
    Ok(row)
}
