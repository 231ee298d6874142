use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::repo_types::{DietaryFlags, DishIngredient, Nutrition};
use crate::profile::DietPreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Invalid difficulty '{}'. Valid options: easy, medium, hard",
                s
            )),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Validated dish fields, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct DishDraft {
    pub name: String,
    pub category: String,
    pub prep_time: i32,
    pub servings: i32,
    pub difficulty: Difficulty,
    pub nutrition: Nutrition,
    pub dietary: DietaryFlags,
    pub ingredients: Vec<DishIngredient>,
    pub instructions: String,
}

impl DishDraft {
    /// Trim text, check ranges, and make the dietary flags consistent.
    pub fn validate(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        if self.name.is_empty() {
            return Err("Dish name is required".into());
        }
        if self.category.is_empty() {
            return Err("Dish category is required".into());
        }
        if self.prep_time < 0 {
            return Err("Prep time cannot be negative".into());
        }
        if self.servings < 1 {
            return Err("Servings must be at least 1".into());
        }
        let n = &self.nutrition;
        if [n.calories, n.protein_g, n.carbs_g, n.fat_g, n.fiber_g]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err("Nutrition values must be non-negative".into());
        }
        for ing in &mut self.ingredients {
            ing.name = ing.name.trim().to_string();
            ing.unit = ing.unit.trim().to_string();
            if ing.name.is_empty() {
                return Err("Ingredient name is required".into());
            }
            if !ing.quantity.is_finite() || ing.quantity <= 0.0 {
                return Err(format!("Ingredient '{}' needs a positive quantity", ing.name));
            }
        }
        // vegan food is vegetarian and dairy-free by definition
        if self.dietary.vegan {
            self.dietary.vegetarian = true;
            self.dietary.dairy_free = true;
        }
        Ok(self)
    }
}

/// Dietary flag filter derived from a diet preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DietaryFilter {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
}

impl DietaryFilter {
    pub fn for_diet(diet: DietPreference) -> Self {
        let mut f = DietaryFilter::default();
        match diet {
            DietPreference::Vegetarian => f.vegetarian = true,
            DietPreference::Vegan => f.vegan = true,
            DietPreference::GlutenFree => f.gluten_free = true,
            // no flag describes these diets
            DietPreference::None
            | DietPreference::Pescatarian
            | DietPreference::Keto
            | DietPreference::Paleo => {}
        }
        f
    }
}

/// Substring pattern for `ILIKE ... ESCAPE '\'`; wildcards in the search text match literally.
pub fn like_pattern(search: &str) -> String {
    let mut out = String::with_capacity(search.len() + 2);
    out.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_wildcards_are_literal() {
        assert_eq!(like_pattern("soup"), "%soup%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }

    fn draft() -> DishDraft {
        DishDraft {
            name: "  Lentil soup ".into(),
            category: "Soup".into(),
            prep_time: 30,
            servings: 4,
            difficulty: Difficulty::Easy,
            nutrition: Nutrition {
                calories: 320.0,
                protein_g: 18.0,
                ..Default::default()
            },
            dietary: DietaryFlags::default(),
            ingredients: vec![DishIngredient::new(" lentils ", 250.0, "g")],
            instructions: "Simmer.".into(),
        }
    }

    #[test]
    fn validate_trims_and_accepts() {
        let d = draft().validate().unwrap();
        assert_eq!(d.name, "Lentil soup");
        assert_eq!(d.ingredients[0].name, "lentils");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut d = draft();
        d.name = "   ".into();
        assert!(d.validate().is_err());

        let mut d = draft();
        d.servings = 0;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.nutrition.fat_g = -1.0;
        assert!(d.validate().is_err());

        let mut d = draft();
        d.ingredients.push(DishIngredient::new("salt", 0.0, "g"));
        assert!(d.validate().unwrap_err().contains("salt"));
    }

    #[test]
    fn vegan_implies_vegetarian_and_dairy_free() {
        let mut d = draft();
        d.dietary.vegan = true;
        let d = d.validate().unwrap();
        assert!(d.dietary.vegetarian);
        assert!(d.dietary.dairy_free);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
        let d: Difficulty = serde_json::from_str("\"Hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
    }

    #[test]
    fn diet_filter_from_preference() {
        let vegan = DietaryFilter::for_diet(DietPreference::Vegan);
        assert!(vegan.vegan && !vegan.vegetarian);
        assert!(DietaryFilter::for_diet(DietPreference::GlutenFree).gluten_free);
        assert_eq!(DietaryFilter::for_diet(DietPreference::Keto), DietaryFilter::default());
    }
}
