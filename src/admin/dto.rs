use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{ROLE_ADMIN, ROLE_USER};

#[derive(Debug, Default, Serialize, sqlx::FromRow)]
pub struct Overview {
    pub users: i64,
    pub setup_complete: i64,
    pub dishes: i64,
    pub pending_dishes: i64,
    pub meal_plans: i64,
    pub shopping_lists: i64,
    pub stock_items: i64,
    #[sqlx(skip)]
    pub stock_needing_attention: i64,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

impl RoleRequest {
    pub fn validate(&self) -> Result<&'static str, String> {
        match self.role.trim().to_lowercase().as_str() {
            "user" => Ok(ROLE_USER),
            "admin" => Ok(ROLE_ADMIN),
            other => Err(format!("Invalid role '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_normalized() {
        let r = RoleRequest { role: " Admin ".into() };
        assert_eq!(r.validate().unwrap(), ROLE_ADMIN);
        let r = RoleRequest { role: "owner".into() };
        assert!(r.validate().is_err());
    }
}
