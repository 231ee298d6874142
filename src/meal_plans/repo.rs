use anyhow::Context;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::{repo_types::MealPlan, services::MealSlot};

const PLAN_COLUMNS: &str = "owner_id, date, breakfast, lunch, dinner, updated_at";

pub async fn list_range(
    db: &PgPool,
    owner_id: Uuid,
    start: Date,
    end: Date,
) -> anyhow::Result<Vec<MealPlan>> {
    let rows = sqlx::query_as::<_, MealPlan>(&format!(
        r#"
        SELECT {PLAN_COLUMNS}
          FROM meal_plans
         WHERE owner_id = $1 AND date BETWEEN $2 AND $3
         ORDER BY date ASC
        "#
    ))
    .bind(owner_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
    .context("list meal plans in range")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, owner_id: Uuid, date: Date) -> anyhow::Result<Option<MealPlan>> {
    let row = sqlx::query_as::<_, MealPlan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM meal_plans WHERE owner_id = $1 AND date = $2"
    ))
    .bind(owner_id)
    .bind(date)
    .fetch_optional(db)
    .await
    .context("find meal plan")?;
    Ok(row)
}

/// Upsert one slot of the day; the other slots are untouched.
pub async fn set_slot(
    db: &PgPool,
    owner_id: Uuid,
    date: Date,
    slot: MealSlot,
    dish_id: Uuid,
) -> anyhow::Result<MealPlan> {
    let col = slot.column();
    let row = sqlx::query_as::<_, MealPlan>(&format!(
        r#"
        INSERT INTO meal_plans (owner_id, date, {col})
        VALUES ($1, $2, $3)
        ON CONFLICT (owner_id, date)
        DO UPDATE SET {col} = EXCLUDED.{col}, updated_at = now()
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(date)
    .bind(dish_id)
    .fetch_one(db)
    .await
    .with_context(|| format!("set {} slot", col))?;
    Ok(row)
}

/// Clear one slot; a day left with no slots is removed. Returns the remaining plan.
pub async fn clear_slot(
    db: &PgPool,
    owner_id: Uuid,
    date: Date,
    slot: MealSlot,
) -> anyhow::Result<Option<MealPlan>> {
    let col = slot.column();
    let mut tx = db.begin().await.context("begin tx")?;
    let row = sqlx::query_as::<_, MealPlan>(&format!(
        r#"
        UPDATE meal_plans SET {col} = NULL, updated_at = now()
         WHERE owner_id = $1 AND date = $2
        RETURNING {PLAN_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(date)
    .fetch_optional(&mut *tx)
    .await
    .with_context(|| format!("clear {} slot", col))?;

    let remaining = match row {
        Some(p) if p.dish_ids().next().is_none() => {
            sqlx::query("DELETE FROM meal_plans WHERE owner_id = $1 AND date = $2")
                .bind(owner_id)
                .bind(date)
                .execute(&mut *tx)
                .await
                .context("delete empty meal plan")?;
            None
        }
        other => other,
    };
    tx.commit().await.context("commit tx")?;
    Ok(remaining)
}

pub async fn delete_day(db: &PgPool, owner_id: Uuid, date: Date) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meal_plans WHERE owner_id = $1 AND date = $2")
        .bind(owner_id)
        .bind(date)
        .execute(db)
        .await
        .context("delete meal plan")?;
    Ok(res.rows_affected() > 0)
}
