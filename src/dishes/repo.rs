use anyhow::Context;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{repo_types::Dish, services::{like_pattern, DietaryFilter, DishDraft}};

const DISH_COLUMNS: &str = "id, owner_id, name, category, prep_time, servings, difficulty, \
     nutrition, dietary, ingredients, instructions, image_key, approved, created_at, updated_at";

/// Which dishes a listing may return.
#[derive(Debug, Clone, Copy)]
pub enum Visibility {
    /// Approved dishes plus the viewer's own.
    Viewer(Uuid),
    /// Only the given owner's dishes.
    Owner(Uuid),
    /// Only dishes awaiting approval, any owner.
    Pending,
}

#[derive(Debug, Default)]
pub struct DishFilter<'a> {
    pub category: Option<&'a str>,
    pub search: Option<&'a str>,
    pub dietary: DietaryFilter,
}

pub async fn insert(db: &PgPool, owner_id: Uuid, d: &DishDraft) -> anyhow::Result<Dish> {
    let dish = sqlx::query_as::<_, Dish>(&format!(
        r#"
        INSERT INTO dishes (owner_id, name, category, prep_time, servings, difficulty,
                            nutrition, dietary, ingredients, instructions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {DISH_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(&d.name)
    .bind(&d.category)
    .bind(d.prep_time)
    .bind(d.servings)
    .bind(d.difficulty.as_str())
    .bind(Json(d.nutrition))
    .bind(Json(d.dietary))
    .bind(Json(&d.ingredients))
    .bind(&d.instructions)
    .fetch_one(db)
    .await
    .context("insert dish")?;
    Ok(dish)
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Dish>> {
    let dish = sqlx::query_as::<_, Dish>(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find dish")?;
    Ok(dish)
}

pub async fn find_many(db: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<Dish>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let dishes = sqlx::query_as::<_, Dish>(&format!(
        "SELECT {DISH_COLUMNS} FROM dishes WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await
    .context("find dishes by ids")?;
    Ok(dishes)
}

pub async fn list(
    db: &PgPool,
    visibility: Visibility,
    filter: &DishFilter<'_>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Dish>> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {DISH_COLUMNS} FROM dishes WHERE "));
    match visibility {
        Visibility::Viewer(viewer) => {
            qb.push("(approved OR owner_id = ").push_bind(viewer).push(")");
        }
        Visibility::Owner(owner) => {
            qb.push("owner_id = ").push_bind(owner);
        }
        Visibility::Pending => {
            qb.push("NOT approved");
        }
    }
    if let Some(category) = filter.category {
        qb.push(" AND lower(category) = lower(").push_bind(category.to_string()).push(")");
    }
    if let Some(search) = filter.search {
        qb.push(" AND name ILIKE ").push_bind(like_pattern(search)).push(r" ESCAPE '\'");
    }
    let flags = [
        ("vegetarian", filter.dietary.vegetarian),
        ("vegan", filter.dietary.vegan),
        ("gluten_free", filter.dietary.gluten_free),
        ("dairy_free", filter.dietary.dairy_free),
    ];
    for (flag, wanted) in flags {
        if wanted {
            // flag names are fixed identifiers, never user input
            qb.push(format!(" AND (dietary->>'{flag}')::boolean IS TRUE"));
        }
    }
    qb.push(" ORDER BY name ASC, created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let rows = qb
        .build_query_as::<Dish>()
        .fetch_all(db)
        .await
        .context("list dishes")?;
    Ok(rows)
}

/// Replace the editable fields and set the approval flag.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    d: &DishDraft,
    approved: bool,
) -> anyhow::Result<Option<Dish>> {
    let dish = sqlx::query_as::<_, Dish>(&format!(
        r#"
        UPDATE dishes
           SET name = $2, category = $3, prep_time = $4, servings = $5, difficulty = $6,
               nutrition = $7, dietary = $8, ingredients = $9, instructions = $10,
               approved = $11, updated_at = now()
         WHERE id = $1
        RETURNING {DISH_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&d.name)
    .bind(&d.category)
    .bind(d.prep_time)
    .bind(d.servings)
    .bind(d.difficulty.as_str())
    .bind(Json(d.nutrition))
    .bind(Json(d.dietary))
    .bind(Json(&d.ingredients))
    .bind(&d.instructions)
    .bind(approved)
    .fetch_optional(db)
    .await
    .context("update dish")?;
    Ok(dish)
}

pub async fn set_approved(db: &PgPool, id: Uuid, approved: bool) -> anyhow::Result<Option<Dish>> {
    let dish = sqlx::query_as::<_, Dish>(&format!(
        "UPDATE dishes SET approved = $2, updated_at = now() WHERE id = $1 RETURNING {DISH_COLUMNS}"
    ))
    .bind(id)
    .bind(approved)
    .fetch_optional(db)
    .await
    .context("set dish approval")?;
    Ok(dish)
}

pub async fn set_image_key(db: &PgPool, id: Uuid, key: Option<&str>) -> anyhow::Result<()> {
    sqlx::query("UPDATE dishes SET image_key = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(key)
        .execute(db)
        .await
        .context("set dish image key")?;
    Ok(())
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM dishes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete dish")?;
    Ok(res.rows_affected() > 0)
}
