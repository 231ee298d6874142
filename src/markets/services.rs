//! Great-circle distance and travel estimates for the market locator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::repo_types::Market;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MAX_RADIUS_KM: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Walking,
    Cycling,
    Driving,
}

impl TravelMode {
    pub fn speed_kmh(&self) -> f64 {
        match self {
            TravelMode::Walking => 5.0,
            TravelMode::Cycling => 15.0,
            TravelMode::Driving => 40.0,
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "cycling",
            TravelMode::Driving => "driving",
        };
        f.write_str(s)
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "walking" | "walk" => Ok(TravelMode::Walking),
            "cycling" | "bike" => Ok(TravelMode::Cycling),
            "driving" | "car" => Ok(TravelMode::Driving),
            _ => Err(format!("Invalid travel mode '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err("Latitude must be between -90 and 90".into());
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err("Longitude must be between -180 and 180".into());
        }
        Ok(Self { lat, lng })
    }
}

/// Haversine distance in kilometres.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Whole minutes, rounded up so any nonzero trip reads as at least one.
pub fn travel_minutes(distance_km: f64, mode: TravelMode) -> u32 {
    if distance_km <= 0.0 {
        return 0;
    }
    ((distance_km / mode.speed_kmh() * 60.0).ceil() as u32).max(1)
}

/// Lat/lng box enclosing the search circle, or `None` when it would wrap a
/// pole or the antimeridian.
pub fn bounding_box(origin: Coordinates, radius_km: f64) -> Option<(f64, f64, f64, f64)> {
    let d_lat = (radius_km / EARTH_RADIUS_KM).to_degrees();
    let lat_min = origin.lat - d_lat;
    let lat_max = origin.lat + d_lat;
    if lat_min < -90.0 || lat_max > 90.0 {
        return None;
    }
    let d_lng = d_lat / lat_max.abs().max(lat_min.abs()).to_radians().cos();
    let lng_min = origin.lng - d_lng;
    let lng_max = origin.lng + d_lng;
    if lng_min < -180.0 || lng_max > 180.0 {
        return None;
    }
    Some((lat_min, lat_max, lng_min, lng_max))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyMarket {
    #[serde(flatten)]
    pub market: Market,
    pub distance_km: f64,
    pub travel_minutes: u32,
    pub mode: TravelMode,
}

/// Markets within `radius_km` of `origin`, nearest first.
pub fn nearby(
    markets: Vec<Market>,
    origin: Coordinates,
    radius_km: f64,
    mode: TravelMode,
) -> Vec<NearbyMarket> {
    let mut out: Vec<NearbyMarket> = markets
        .into_iter()
        .filter_map(|market| {
            let at = Coordinates {
                lat: market.latitude,
                lng: market.longitude,
            };
            let d = distance_km(origin, at);
            (d <= radius_km).then(|| NearbyMarket {
                distance_km: (d * 100.0).round() / 100.0,
                travel_minutes: travel_minutes(d, mode),
                mode,
                market,
            })
        })
        .collect();
    out.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn market(name: &str, lat: f64, lng: f64) -> Market {
        Market {
            id: Uuid::new_v4(),
            name: name.into(),
            address: String::new(),
            latitude: lat,
            longitude: lng,
            opening_hours: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn same_point_is_zero() {
        let p = Coordinates::new(52.52, 13.405).unwrap();
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = Coordinates::new(0.0, 0.0).unwrap();
        let b = Coordinates::new(1.0, 0.0).unwrap();
        assert!((distance_km(a, b) - 111.19).abs() < 0.01);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn travel_time_by_mode() {
        assert_eq!(travel_minutes(5.0, TravelMode::Walking), 60);
        assert_eq!(travel_minutes(5.0, TravelMode::Cycling), 20);
        assert_eq!(travel_minutes(10.0, TravelMode::Driving), 15);
        assert_eq!(travel_minutes(0.1, TravelMode::Driving), 1);
    }

    #[test]
    fn same_spot_is_zero_minutes_and_any_hop_at_least_one() {
        assert_eq!(travel_minutes(0.0, TravelMode::Walking), 0);
        assert_eq!(travel_minutes(1e-9, TravelMode::Driving), 1);
    }

    #[test]
    fn parses_modes() {
        assert_eq!("Cycling".parse::<TravelMode>().unwrap(), TravelMode::Cycling);
        assert_eq!("car".parse::<TravelMode>().unwrap(), TravelMode::Driving);
        assert!("teleport".parse::<TravelMode>().is_err());
    }

    #[test]
    fn bounding_box_contains_circle() {
        let origin = Coordinates::new(45.0, 10.0).unwrap();
        let (lat_min, lat_max, lng_min, lng_max) = bounding_box(origin, 5.0).unwrap();
        let north = Coordinates::new(lat_max, 10.0).unwrap();
        assert!((distance_km(origin, north) - 5.0).abs() < 0.01);
        assert!(lng_max - 10.0 > lat_max - 45.0);
        assert!(lat_min < 45.0 && lng_min < 10.0);
    }

    #[test]
    fn bounding_box_gives_up_at_the_edges() {
        assert!(bounding_box(Coordinates::new(89.99, 0.0).unwrap(), 5.0).is_none());
        assert!(bounding_box(Coordinates::new(0.0, 179.99).unwrap(), 5.0).is_none());
    }

    #[test]
    fn nearby_filters_and_sorts() {
        let origin = Coordinates::new(0.0, 0.0).unwrap();
        let markets = vec![
            market("far", 0.04, 0.0),
            market("outside", 1.0, 0.0),
            market("near", 0.01, 0.0),
        ];
        let found = nearby(markets, origin, DEFAULT_RADIUS_KM, TravelMode::Walking);
        let names: Vec<_> = found.iter().map(|m| m.market.name.as_str()).collect();
        assert_eq!(names, vec!["near", "far"]);
        assert_eq!(found[0].distance_km, 1.11);
        assert_eq!(found[0].travel_minutes, 14);
    }
}
