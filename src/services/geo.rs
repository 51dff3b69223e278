use crate::models::Coordinates;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two lat/lon points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> Coordinates {
        Coordinates { lat, lon }
    }

    #[test]
    fn identical_points_are_zero_distance() {
        assert_eq!(haversine_km(at(40.0, -74.0), at(40.0, -74.0)), 0.0);
        assert_eq!(haversine_km(at(-33.9, 151.2), at(-33.9, 151.2)), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (at(40.0, -74.0), at(40.01, -74.01)),
            (at(52.37, 4.89), at(51.92, 4.48)),
            (at(-12.0, 130.8), at(35.68, 139.69)),
        ];
        for (a, b) in pairs {
            let there = haversine_km(a, b);
            let back = haversine_km(b, a);
            assert!((there - back).abs() < 1e-9, "{there} vs {back}");
        }
    }

    #[test]
    fn short_hop_near_new_jersey() {
        let d = haversine_km(at(40.0, -74.0), at(40.01, -74.01));
        assert!((d - 1.4).abs() < 0.05, "expected ~1.4 km, got {d}");
    }

    #[test]
    fn longer_hop_well_outside_any_radius() {
        let d = haversine_km(at(40.0, -74.0), at(40.5, -74.5));
        assert!((d - 62.0).abs() < 10.0, "expected ~62 km, got {d}");
    }

    #[test]
    fn amsterdam_to_rotterdam_is_about_57_km() {
        let d = haversine_km(at(52.3676, 4.9041), at(51.9225, 4.47917));
        assert!((d - 57.5).abs() < 1.5, "got {d}");
    }
}
