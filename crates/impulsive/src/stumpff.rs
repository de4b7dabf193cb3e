//! Stumpff functions C2 and C3 for the universal-variable formulation.
//!
//! Closed trigonometric/hyperbolic forms away from zero; truncated power
//! series inside |psi| < 1e-6 where the closed forms cancel catastrophically.

/// Switch-over point between the closed forms and the power series.
const SERIES_THRESHOLD: f64 = 1e-6;

/// Stumpff C2(psi) = (1 - cos sqrt(psi)) / psi, extended through psi <= 0.
pub fn c2(psi: f64) -> f64 {
    if psi > SERIES_THRESHOLD {
        let sqrt_psi = psi.sqrt();
        (1.0 - sqrt_psi.cos()) / psi
    } else if psi < -SERIES_THRESHOLD {
        let sqrt_neg = (-psi).sqrt();
        (sqrt_neg.cosh() - 1.0) / (-psi)
    } else {
        // 1/2! - psi/4! + psi^2/6! - psi^3/8!
        0.5 - psi / 24.0 + psi * psi / 720.0 - psi * psi * psi / 40_320.0
    }
}

/// Stumpff C3(psi) = (sqrt(psi) - sin sqrt(psi)) / psi^(3/2), extended through psi <= 0.
pub fn c3(psi: f64) -> f64 {
    if psi > SERIES_THRESHOLD {
        let sqrt_psi = psi.sqrt();
        (sqrt_psi - sqrt_psi.sin()) / (psi * sqrt_psi)
    } else if psi < -SERIES_THRESHOLD {
        let sqrt_neg = (-psi).sqrt();
        (sqrt_neg.sinh() - sqrt_neg) / (-psi * sqrt_neg)
    } else {
        // 1/3! - psi/5! + psi^2/7! - psi^3/9!
        1.0 / 6.0 - psi / 120.0 + psi * psi / 5_040.0 - psi * psi * psi / 362_880.0
    }
}
