use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::IngredientRequest, repo_types::Ingredient};

pub async fn list(db: &PgPool, category: Option<&str>) -> anyhow::Result<Vec<Ingredient>> {
    let rows = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, category, unit, price_per_unit
          FROM ingredients
         WHERE ($1::text IS NULL OR lower(category) = lower($1))
         ORDER BY category ASC, name ASC
        "#,
    )
    .bind(category)
    .fetch_all(db)
    .await
    .context("list ingredients")?;
    Ok(rows)
}

/// Catalog entries whose name matches one of `names`, case-insensitively.
pub async fn find_by_names(db: &PgPool, names: &[String]) -> anyhow::Result<Vec<Ingredient>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    let rows = sqlx::query_as::<_, Ingredient>(
        r#"
        SELECT id, name, category, unit, price_per_unit
          FROM ingredients
         WHERE lower(name) = ANY($1)
        "#,
    )
    .bind(&lowered)
    .fetch_all(db)
    .await
    .context("find ingredients by name")?;
    Ok(rows)
}

pub(super) async fn insert(db: &PgPool, req: &IngredientRequest) -> anyhow::Result<Ingredient> {
    let row = sqlx::query_as::<_, Ingredient>(
        r#"
        INSERT INTO ingredients (name, category, unit, price_per_unit)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, category, unit, price_per_unit
        "#,
    )
    .bind(&req.name)
    .bind(&req.category)
    .bind(&req.unit)
    .bind(req.price_per_unit)
    .fetch_one(db)
    .await
    .context("insert ingredient")?;
    Ok(row)
}

pub(super) async fn update(
    db: &PgPool,
    id: Uuid,
    req: &IngredientRequest,
) -> anyhow::Result<Option<Ingredient>> {
    let row = sqlx::query_as::<_, Ingredient>(
        r#"
        UPDATE ingredients
           SET name = $2, category = $3, unit = $4, price_per_unit = $5
         WHERE id = $1
        RETURNING id, name, category, unit, price_per_unit
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.category)
    .bind(&req.unit)
    .bind(req.price_per_unit)
    .fetch_optional(db)
    .await
    .context("update ingredient")?;
    Ok(row)
}

pub(super) async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM ingredients WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete ingredient")?;
    Ok(res.rows_affected() > 0)
}

pub(super) async fn name_taken(db: &PgPool, name: &str, except: Option<Uuid>) -> anyhow::Result<bool> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM ingredients WHERE lower(name) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(name)
    .bind(except)
    .fetch_one(db)
    .await
    .context("check ingredient name")?;
    Ok(taken)
}
