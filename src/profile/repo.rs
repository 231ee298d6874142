use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{repo::USER_COLUMNS, repo_types::User};

/// Apply the provided profile fields, leaving the others untouched.
pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    display_name: Option<&str>,
    diet_preference: Option<&str>,
    household_size: Option<i32>,
) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
           SET display_name = COALESCE($2, display_name),
               diet_preference = COALESCE($3, diet_preference),
               household_size = COALESCE($4, household_size)
         WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(display_name)
    .bind(diet_preference)
    .bind(household_size)
    .fetch_optional(db)
    .await
    .context("update profile")?;
    Ok(user)
}

pub async fn mark_setup_complete(db: &PgPool, user_id: Uuid) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET setup_complete = TRUE WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .fetch_one(db)
    .await
    .context("mark setup complete")?;
    Ok(user)
}
