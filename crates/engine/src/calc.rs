use crate::models::{GeoCoordinate, ScoreBreakdown};

/// Mean Earth radius in statute miles.
const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Width of one penalty band.
pub const RING_WIDTH_MILES: f64 = 200.0;

const POINTS_PER_TURN: i64 = 1000;
const PENALTY_PER_RING: i64 = 1000;

/// Highest turn number; a guess on turn 4 starts from 1000 points.
pub const MAX_TURN: u8 = 4;

/// Great-circle distance between two coordinates (haversine).
pub fn distance_miles(a: GeoCoordinate, b: GeoCoordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    // Rounding can push h just past 1 for antipodal points.
    let h = ((d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Number of complete 200-mile bands in `distance_miles`.
pub fn distance_rings(distance_miles: f64) -> u32 {
    (distance_miles.max(0.0) / RING_WIDTH_MILES).floor() as u32
}

/// Score a guess made on `turn` (1-4) that landed `distance_miles` away.
pub fn score(turn: u8, distance_miles: f64) -> ScoreBreakdown {
    let base_points = (i64::from(MAX_TURN) + 1 - i64::from(turn)) * POINTS_PER_TURN;
    let rings = distance_rings(distance_miles);
    let penalty = i64::from(rings) * PENALTY_PER_RING;
    let final_score = (base_points - penalty).max(0);

    ScoreBreakdown {
        base_points,
        penalty,
        final_score: u32::try_from(final_score).unwrap_or(u32::MAX),
        distance_rings: rings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> GeoCoordinate {
        GeoCoordinate::new(lat, lon)
    }

    #[test]
    fn test_distance_identical_is_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (36.27, -121.609), (-89.9, 179.9), (90.0, -180.0)] {
            assert_eq!(distance_miles(c(lat, lon), c(lat, lon)), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (c(40.7128, -74.006), c(51.5074, -0.1278)),
            (c(-33.86, 151.21), c(35.68, 139.69)),
            (c(0.0, 179.5), c(0.0, -179.5)),
        ];
        for (a, b) in pairs {
            assert!((distance_miles(a, b) - distance_miles(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_new_york_london() {
        let d = distance_miles(c(40.7128, -74.006), c(51.5074, -0.1278));
        assert!((d - 3461.39).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_distance_one_degree_of_equator() {
        let d = distance_miles(c(0.0, 0.0), c(0.0, 1.0));
        assert!((d - 69.0976).abs() < 1e-3);
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let d = distance_miles(c(0.0, 179.5), c(0.0, -179.5));
        assert!((d - 69.0976).abs() < 1e-3);
    }

    #[test]
    fn test_antipodal_distance_is_half_circumference() {
        let half = std::f64::consts::PI * EARTH_RADIUS_MILES;
        for i in -900..=900 {
            let lat = f64::from(i) / 10.0;
            let d = distance_miles(c(lat, 10.0), c(-lat, -170.0));
            assert!(d.is_finite(), "lat={lat} gave {d}");
            assert!((d - half).abs() < 1.0, "lat={lat} gave {d}");
            assert_eq!(score(1, d).final_score, 0, "lat={lat}");
        }
    }

    #[test]
    fn test_distance_big_sur_to_los_angeles() {
        let d = distance_miles(c(36.27, -121.609), c(34.0522, -118.2437));
        assert!((d - 244.15).abs() < 0.1);
    }

    #[test]
    fn test_perfect_guess_scores_base_points() {
        for turn in 1..=MAX_TURN {
            let s = score(turn, 0.0);
            assert_eq!(s.final_score, (5 - u32::from(turn)) * 1000);
            assert_eq!(s.penalty, 0);
        }
    }

    #[test]
    fn test_turn_one_zero_distance() {
        let s = score(1, 0.0);
        assert_eq!(s.base_points, 4000);
        assert_eq!(s.final_score, 4000);
    }

    #[test]
    fn test_ring_boundary() {
        let s = score(1, 199.999);
        assert_eq!(s.distance_rings, 0);
        assert_eq!(s.penalty, 0);

        let s = score(1, 200.0);
        assert_eq!(s.distance_rings, 1);
        assert_eq!(s.penalty, 1000);
    }

    #[test]
    fn test_turn_two_at_450_miles() {
        let s = score(2, 450.0);
        assert_eq!(
            s,
            ScoreBreakdown {
                base_points: 3000,
                penalty: 2000,
                final_score: 1000,
                distance_rings: 2,
            }
        );
    }

    #[test]
    fn test_score_floors_at_zero() {
        let s = score(4, 12_000.0);
        assert_eq!(s.final_score, 0);
        assert_eq!(s.distance_rings, 60);
        assert_eq!(s.penalty, 60_000);
    }

    #[test]
    fn test_score_non_increasing_in_distance() {
        for turn in 1..=MAX_TURN {
            let mut last = u32::MAX;
            let mut d = 0.0;
            while d < 2000.0 {
                let s = score(turn, d);
                assert!(s.final_score <= last);
                last = s.final_score;
                d += 7.5;
            }
            assert_eq!(last, 0);
        }
    }
}
