use crate::GeoPoint;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers (haversine).
///
/// NaN coordinates propagate; callers check presence before calling.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKYO: GeoPoint = GeoPoint {
        lat: 35.6812,
        lng: 139.7671,
    };
    const YOKOHAMA: GeoPoint = GeoPoint {
        lat: 35.4660,
        lng: 139.6223,
    };

    #[test]
    fn same_point_is_zero() {
        for point in [TOKYO, YOKOHAMA, GeoPoint::new(-33.87, 151.21), GeoPoint::new(0.0, 0.0)] {
            assert_eq!(haversine_km(point, point), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let there = haversine_km(TOKYO, YOKOHAMA);
        let back = haversine_km(YOKOHAMA, TOKYO);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn tokyo_to_yokohama_is_about_27km() {
        let km = haversine_km(TOKYO, YOKOHAMA);
        assert!(km > 26.0 && km < 28.0, "got {km}");
    }

    #[test]
    fn one_degree_of_latitude_is_about_111km() {
        let km = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((km - 111.19).abs() < 0.05, "got {km}");
    }

    #[test]
    fn nan_propagates() {
        let km = haversine_km(GeoPoint::new(f64::NAN, 0.0), TOKYO);
        assert!(km.is_nan());
    }
}
