//! Great-circle distance on a spherical Earth.

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two coordinates given in
/// degrees. Total for all finite inputs; antipodal points come out at
/// roughly half the sphere's circumference.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_between_identical_points() {
        assert_eq!(distance_km(45.0, 16.0, 45.0, 16.0), 0.0);
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        // One degree of arc on a 6371 km sphere is ~111.19 km.
        let d = distance_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half_circumference).abs() < 1.0, "got {d}");
    }

    #[test]
    fn symmetric_in_its_endpoints() {
        let a = distance_km(10.0, 20.0, -30.0, 40.0);
        let b = distance_km(-30.0, 40.0, 10.0, 20.0);
        assert!((a - b).abs() < 1e-9);
    }
}
