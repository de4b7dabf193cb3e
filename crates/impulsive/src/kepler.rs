//! Kepler-equation and universal-variable propagation solvers.

use transit_core::vector::{self, Vector3};

use crate::NumericalNonConvergence;
use crate::stumpff;

/// Newton tolerance on the eccentric-anomaly update.
const KEPLER_TOL: f64 = 1e-12;
/// Iteration cap for the elliptic Kepler equation.
const KEPLER_MAX_ITER: u32 = 50;
/// Relative tolerance on the time residual of the universal Kepler equation.
/// Sampled trajectory endpoints inherit this as a sub-kilometre position
/// bound at heliocentric speeds.
const UNIVERSAL_TIME_TOL: f64 = 1e-10;
/// Iteration cap for the universal-variable Newton loop.
const UNIVERSAL_MAX_ITER: u32 = 60;
/// Threshold on 1/a below which an orbit is treated as parabolic.
const PARABOLIC_ALPHA: f64 = 1e-12;

/// Solve Kepler's equation `M = E - e sin E` for the eccentric anomaly.
///
/// The mean anomaly may be any finite value; the returned eccentric anomaly
/// corresponds to `M` normalised into [0, 2pi).
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, NumericalNonConvergence> {
    if !(0.0..1.0).contains(&eccentricity) || !mean_anomaly.is_finite() {
        return Err(NumericalNonConvergence::new("kepler equation", 0));
    }
    let m = mean_anomaly.rem_euclid(std::f64::consts::TAU);

    // High-eccentricity orbits need a nudged starting value or Newton stalls.
    let mut ea = if eccentricity > 0.8 {
        m + eccentricity * m.sin().signum()
    } else {
        m
    };

    for _ in 0..KEPLER_MAX_ITER {
        let f = ea - eccentricity * ea.sin() - m;
        let f_prime = 1.0 - eccentricity * ea.cos();
        let delta = f / f_prime;
        ea -= delta;
        if delta.abs() < KEPLER_TOL {
            return Ok(ea);
        }
    }

    Err(NumericalNonConvergence::new(
        "kepler equation",
        KEPLER_MAX_ITER,
    ))
}

/// Advance a state vector by `dt_s` seconds of two-body motion.
///
/// Universal-variable f/g propagation, valid for elliptic, parabolic, and
/// hyperbolic orbits alike. Positions are kilometres, velocities km/s.
pub fn propagate_universal(
    r0_km: &Vector3,
    v0_km_s: &Vector3,
    mu_km3_s2: f64,
    dt_s: f64,
) -> Result<(Vector3, Vector3), NumericalNonConvergence> {
    if !(mu_km3_s2 > 0.0) || !dt_s.is_finite() {
        return Err(NumericalNonConvergence::new("universal propagation", 0));
    }
    let r0n = vector::norm(r0_km);
    if r0n <= 0.0 {
        return Err(NumericalNonConvergence::new("universal propagation", 0));
    }
    if dt_s == 0.0 {
        return Ok((*r0_km, *v0_km_s));
    }

    let sqrt_mu = mu_km3_s2.sqrt();
    let v0_sq = vector::dot(v0_km_s, v0_km_s);
    let alpha = 2.0 / r0n - v0_sq / mu_km3_s2;
    let rv = vector::dot(r0_km, v0_km_s);

    let mut chi = initial_chi(alpha, rv, r0n, mu_km3_s2, sqrt_mu, dt_s);

    let mut converged = false;
    for _ in 0..UNIVERSAL_MAX_ITER {
        let psi = chi * chi * alpha;
        let c2 = stumpff::c2(psi);
        let c3 = stumpff::c3(psi);
        let r = chi * chi * c2
            + rv / sqrt_mu * chi * (1.0 - psi * c3)
            + r0n * (1.0 - psi * c2);
        let t = (chi.powi(3) * c3 + rv / sqrt_mu * chi * chi * c2 + r0n * chi * (1.0 - psi * c3))
            / sqrt_mu;
        let residual = dt_s - t;
        if residual.abs() <= UNIVERSAL_TIME_TOL * dt_s.abs().max(1.0) {
            converged = true;
            break;
        }
        if r.abs() < 1e-12 || !r.is_finite() {
            break;
        }
        chi += residual * sqrt_mu / r;
    }
    if !converged || !chi.is_finite() {
        return Err(NumericalNonConvergence::new(
            "universal propagation",
            UNIVERSAL_MAX_ITER,
        ));
    }

    let psi = chi * chi * alpha;
    let c2 = stumpff::c2(psi);
    let c3 = stumpff::c3(psi);
    let f = 1.0 - chi * chi * c2 / r0n;
    let g = dt_s - chi.powi(3) * c3 / sqrt_mu;
    let r_vec = vector::add(&vector::scale(r0_km, f), &vector::scale(v0_km_s, g));
    let rn = vector::norm(&r_vec);
    if rn <= 0.0 {
        return Err(NumericalNonConvergence::new(
            "universal propagation",
            UNIVERSAL_MAX_ITER,
        ));
    }
    let g_dot = 1.0 - chi * chi * c2 / rn;
    let f_dot = sqrt_mu / (rn * r0n) * chi * (psi * c3 - 1.0);
    let v_vec = vector::add(&vector::scale(r0_km, f_dot), &vector::scale(v0_km_s, g_dot));

    Ok((r_vec, v_vec))
}

/// Starting value for the universal anomaly, per orbit regime.
fn initial_chi(alpha: f64, rv: f64, r0n: f64, mu: f64, sqrt_mu: f64, dt: f64) -> f64 {
    if alpha > PARABOLIC_ALPHA {
        sqrt_mu * dt * alpha
    } else if alpha < -PARABOLIC_ALPHA {
        let a = 1.0 / alpha;
        let denom = rv + dt.signum() * (-mu * a).sqrt() * (1.0 - r0n * alpha);
        let arg = -2.0 * mu * alpha * dt / denom;
        let guess = dt.signum() * (-a).sqrt() * arg.abs().max(f64::MIN_POSITIVE).ln();
        if guess.is_finite() {
            guess
        } else {
            sqrt_mu * dt / r0n
        }
    } else {
        sqrt_mu * dt / r0n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use transit_core::constants::AU_KM;

    const MU_SUN: f64 = 1.327_124_400_18e11; // km^3 / s^2
    const MU_EARTH: f64 = 398_600.441_8; // km^3 / s^2

    #[test]
    fn kepler_circular_is_identity() {
        let e = solve_kepler(1.0, 0.0).expect("solve");
        assert_relative_eq!(e, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn kepler_equation_holds_at_high_eccentricity() {
        for &m in &[0.1, 0.5, 1.0, 2.0, 3.0, 5.0] {
            let ea = solve_kepler(m, 0.95).expect("solve");
            let m_back = ea - 0.95 * ea.sin();
            assert_relative_eq!(
                m_back.rem_euclid(std::f64::consts::TAU),
                m.rem_euclid(std::f64::consts::TAU),
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn kepler_rejects_hyperbolic_eccentricity() {
        assert!(solve_kepler(1.0, 1.5).is_err());
    }

    #[test]
    fn universal_propagation_quarter_circular_orbit() {
        let r0 = [AU_KM, 0.0, 0.0];
        let v_circ = (MU_SUN / AU_KM).sqrt();
        let v0 = [0.0, v_circ, 0.0];
        let period = std::f64::consts::TAU * (AU_KM.powi(3) / MU_SUN).sqrt();

        let (r, v) = propagate_universal(&r0, &v0, MU_SUN, period / 4.0).expect("propagate");
        assert_relative_eq!(r[0].abs() / AU_KM, 0.0, epsilon = 1e-5);
        assert_relative_eq!(r[1], AU_KM, max_relative = 1e-6);
        assert_relative_eq!(v[0], -v_circ, max_relative = 1e-6);
    }

    #[test]
    fn universal_propagation_round_trip() {
        let r0 = [8_000.0, 1_000.0, -500.0];
        let v0 = [-1.2, 7.1, 0.4];
        let dt = 5_400.0;
        let (r1, v1) = propagate_universal(&r0, &v0, MU_EARTH, dt).expect("forward");
        let (r2, v2) = propagate_universal(&r1, &v1, MU_EARTH, -dt).expect("backward");
        for i in 0..3 {
            assert_relative_eq!(r2[i], r0[i], epsilon = 1e-3);
            assert_relative_eq!(v2[i], v0[i], epsilon = 1e-7);
        }
    }

    #[test]
    fn universal_propagation_hyperbolic_escape() {
        let r0 = [7_000.0, 0.0, 0.0];
        let v_esc = (2.0 * MU_EARTH / 7_000.0).sqrt();
        let v0 = [0.0, 1.3 * v_esc, 0.0];
        let (r, _v) = propagate_universal(&r0, &v0, MU_EARTH, 86_400.0).expect("propagate");
        assert!(vector::norm(&r) > 100_000.0, "escape trajectory should recede");
    }

    #[test]
    fn universal_propagation_rejects_degenerate_input() {
        assert!(propagate_universal(&[0.0; 3], &[1.0, 0.0, 0.0], MU_EARTH, 10.0).is_err());
        assert!(propagate_universal(&[7_000.0, 0.0, 0.0], &[0.0, 7.5, 0.0], -1.0, 10.0).is_err());
    }

    proptest! {
        // The Kepler solve must satisfy its own equation anywhere in the
        // elliptic range the registry can feed it.
        #[test]
        fn kepler_residual_stays_small(m in -20.0..20.0f64, e in 0.0..0.97f64) {
            let ea = solve_kepler(m, e).expect("solve");
            let m_back = ea - e * ea.sin();
            let diff = (m_back.rem_euclid(std::f64::consts::TAU)
                - m.rem_euclid(std::f64::consts::TAU))
                .abs();
            let wrapped = diff.min(std::f64::consts::TAU - diff);
            prop_assert!(wrapped < 1e-9);
        }
    }
}
