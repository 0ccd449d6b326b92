//! Great-circle distance

/// Mean Earth radius used for all distance computations
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in meters between two coordinates given in degrees.
///
/// Returns 0 for coincident points and stays finite for antipodal ones.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` just outside [0, 1] near antipodes
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn coincident_points() {
        assert_eq!(distance(11.644636, 78.122278, 11.644636, 78.122278), 0.0);
        assert_eq!(distance(0.0, 0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn symmetric() {
        let there = distance(11.644636, 78.122278, 11.6457472, 78.1221888);
        let back = distance(11.6457472, 78.1221888, 11.644636, 78.122278);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn nearby_points() {
        let d = distance(11.644636, 78.122278, 11.6457472, 78.1221888);
        assert!(d > 100.0 && d < 150.0, "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - EARTH_RADIUS_METERS * PI / 180.0).abs() < 1e-6);
    }

    #[test]
    fn antipodal_points() {
        let d = distance(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_METERS).abs() < 1.0);

        let d = distance(90.0, 0.0, -90.0, 0.0);
        assert!((d - PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }
}
