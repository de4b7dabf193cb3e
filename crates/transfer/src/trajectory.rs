//! Sampling of heliocentric transfer arcs for visualisation and state
//! reconstruction.

use transit_core::vector::Vector3;
use transit_impulsive::kepler::propagate_universal;
use transit_impulsive::NumericalNonConvergence;

/// Sample `samples` positions uniformly in time along a two-body arc.
///
/// The first point reproduces `r1_km` exactly; the last is the propagated
/// state at `tof_s`. Fewer than two samples are widened to two so the
/// endpoints always exist.
pub fn compute_trajectory_points(
    r1_km: &Vector3,
    v1_km_s: &Vector3,
    mu_km3_s2: f64,
    tof_s: f64,
    samples: usize,
) -> Result<Vec<Vector3>, NumericalNonConvergence> {
    let count = samples.max(2);
    let mut points = Vec::with_capacity(count);
    for step in 0..count {
        let t = tof_s * step as f64 / (count - 1) as f64;
        let (position, _) = propagate_universal(r1_km, v1_km_s, mu_km3_s2, t)?;
        points.push(position);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_core::constants::AU_KM;
    use transit_core::vector;

    const MU_SUN: f64 = 1.327_124_400_18e11; // km^3 / s^2

    #[test]
    fn endpoints_match_the_arc() {
        let r1 = [AU_KM, 0.0, 0.0];
        let v_circ = (MU_SUN / AU_KM).sqrt();
        let v1 = [0.0, v_circ, 0.0];
        let period = std::f64::consts::TAU * (AU_KM.powi(3) / MU_SUN).sqrt();

        let points = compute_trajectory_points(&r1, &v1, MU_SUN, period / 2.0, 33).expect("sample");
        assert_eq!(points.len(), 33);
        assert_eq!(points[0], r1);
        let expected_end = [-AU_KM, 0.0, 0.0];
        let miss = vector::norm(&vector::sub(&points[32], &expected_end));
        assert!(miss < 1.0, "endpoint miss {miss} km");
    }

    #[test]
    fn sample_count_is_floored_at_two() {
        let r1 = [AU_KM, 0.0, 0.0];
        let v1 = [0.0, 30.0, 0.0];
        let points = compute_trajectory_points(&r1, &v1, MU_SUN, 86_400.0, 0).expect("sample");
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn degenerate_state_is_rejected() {
        assert!(compute_trajectory_points(&[0.0; 3], &[1.0, 0.0, 0.0], MU_SUN, 10.0, 4).is_err());
    }
}
