use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::repo_types::User;

pub const MIN_HOUSEHOLD: i32 = 1;
pub const MAX_HOUSEHOLD: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum DietPreference {
    None,
    Vegetarian,
    Vegan,
    Pescatarian,
    Keto,
    Paleo,
    GlutenFree,
}

impl DietPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietPreference::None => "none",
            DietPreference::Vegetarian => "vegetarian",
            DietPreference::Vegan => "vegan",
            DietPreference::Pescatarian => "pescatarian",
            DietPreference::Keto => "keto",
            DietPreference::Paleo => "paleo",
            DietPreference::GlutenFree => "gluten_free",
        }
    }
}

impl fmt::Display for DietPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(DietPreference::None),
            "vegetarian" => Ok(DietPreference::Vegetarian),
            "vegan" => Ok(DietPreference::Vegan),
            "pescatarian" => Ok(DietPreference::Pescatarian),
            "keto" => Ok(DietPreference::Keto),
            "paleo" => Ok(DietPreference::Paleo),
            "gluten_free" => Ok(DietPreference::GlutenFree),
            _ => Err(format!("Invalid diet preference '{}'", s)),
        }
    }
}

impl TryFrom<String> for DietPreference {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

pub fn validate_household(size: i32) -> Result<i32, String> {
    if (MIN_HOUSEHOLD..=MAX_HOUSEHOLD).contains(&size) {
        Ok(size)
    } else {
        Err(format!(
            "Household size must be between {} and {}",
            MIN_HOUSEHOLD, MAX_HOUSEHOLD
        ))
    }
}

/// Wizard steps still missing, in the order the wizard asks for them.
pub fn missing_steps(user: &User) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if user.display_name.as_deref().map_or(true, |n| n.trim().is_empty()) {
        missing.push("display_name");
    }
    if user.diet_preference.is_none() {
        missing.push("diet_preference");
    }
    if user.household_size.is_none() {
        missing.push("household_size");
    }
    missing
}
