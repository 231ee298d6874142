use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct IngredientRequest {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub price_per_unit: f64,
}

impl IngredientRequest {
    pub fn validate(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.unit = self.unit.trim().to_string();
        if self.name.is_empty() || self.category.is_empty() {
            return Err("Ingredient name and category are required".into());
        }
        if !self.price_per_unit.is_finite() || self.price_per_unit < 0.0 {
            return Err("Price per unit must be non-negative".into());
        }
        Ok(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_and_checks_price() {
        let ok = IngredientRequest {
            name: " Apple ".into(),
            category: "Fruits".into(),
            unit: "pcs".into(),
            price_per_unit: 0.4,
        }
        .validate()
        .unwrap();
        assert_eq!(ok.name, "Apple");

        let bad = IngredientRequest {
            name: "Apple".into(),
            category: "Fruits".into(),
            unit: String::new(),
            price_per_unit: -1.0,
        };
        assert!(bad.validate().is_err());
    }
}
