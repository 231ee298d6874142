use serde::Deserialize;

use super::services::{Coordinates, TravelMode, DEFAULT_RADIUS_KM, MAX_RADIUS_KM};

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
    pub mode: Option<String>,
}

impl NearbyQuery {
    pub fn resolve(&self) -> Result<(Coordinates, f64, TravelMode), String> {
        let origin = Coordinates::new(self.lat, self.lng)?;
        let radius = self.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
        if !radius.is_finite() || radius <= 0.0 || radius > MAX_RADIUS_KM {
            return Err(format!("radius_km must be in (0, {}]", MAX_RADIUS_KM));
        }
        let mode = match self.mode.as_deref() {
            Some(m) => m.parse()?,
            None => TravelMode::default(),
        };
        Ok((origin, radius, mode))
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_hours: Option<String>,
}

impl MarketRequest {
    pub fn validate(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err("Market name is required".into());
        }
        Coordinates::new(self.latitude, self.longitude)?;
        self.address = self.address.trim().to_string();
        self.opening_hours = self
            .opening_hours
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(radius_km: Option<f64>, mode: Option<&str>) -> NearbyQuery {
        NearbyQuery {
            lat: 48.85,
            lng: 2.35,
            radius_km,
            mode: mode.map(Into::into),
        }
    }

    #[test]
    fn defaults_to_walking_within_five_km() {
        let (_, radius, mode) = query(None, None).resolve().unwrap();
        assert_eq!(radius, DEFAULT_RADIUS_KM);
        assert_eq!(mode, TravelMode::Walking);
    }

    #[test]
    fn rejects_bad_radius_and_mode() {
        assert!(query(Some(0.0), None).resolve().is_err());
        assert!(query(Some(500.0), None).resolve().is_err());
        assert!(query(None, Some("boat")).resolve().is_err());
    }

    #[test]
    fn market_request_requires_name_and_valid_position() {
        let ok = MarketRequest {
            name: " Corner Shop ".into(),
            address: "1 Main St".into(),
            latitude: 10.0,
            longitude: 10.0,
            opening_hours: Some(" ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.name, "Corner Shop");
        assert_eq!(ok.opening_hours, None);

        let bad = MarketRequest {
            name: "Shop".into(),
            address: String::new(),
            latitude: 100.0,
            longitude: 0.0,
            opening_hours: None,
        };
        assert!(bad.validate().is_err());
    }
}
