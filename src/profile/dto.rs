use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::services::DietPreference;
use crate::auth::repo_types::User;

/// Partial update; any subset of the wizard steps.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub diet_preference: Option<DietPreference>,
    pub household_size: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub diet_preference: Option<String>,
    pub household_size: Option<i32>,
    pub setup_complete: bool,
    pub missing_steps: Vec<&'static str>,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        let missing_steps = super::services::missing_steps(&u);
        Self {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            diet_preference: u.diet_preference,
            household_size: u.household_size,
            setup_complete: u.setup_complete,
            missing_steps,
        }
    }
}
