//! Coplanar circular-to-circular transfer estimator.
//!
//! Prices same-body legs, anchors the interplanetary time-of-flight sweep,
//! and supplies the feasibility floor reported when no Lambert branch
//! converges. Burns come back as unsigned magnitudes in m/s, the unit the
//! leg records carry.

use transit_core::units::kms_to_ms;

/// Two-burn estimate between circular coplanar orbits of radii r1 and r2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannEstimate {
    pub dv_depart_m_s: f64,
    pub dv_arrive_m_s: f64,
    pub dv_total_m_s: f64,
    pub tof_s: f64,
    /// Semi-major axis of the transfer ellipse (km).
    pub transfer_sma_km: f64,
}

/// Estimate the classical two-burn transfer between circular coplanar
/// orbits about a body with parameter `mu_km3_s2`.
///
/// Valid for inward and outward transfers alike; the direction only decides
/// which endpoint is the periapsis of the connecting ellipse.
pub fn hohmann_estimate(r1_km: f64, r2_km: f64, mu_km3_s2: f64) -> HohmannEstimate {
    assert!(r1_km > 0.0 && r2_km > 0.0 && mu_km3_s2 > 0.0);

    let sma = 0.5 * (r1_km + r2_km);
    let tof_s = std::f64::consts::PI * (sma.powi(3) / mu_km3_s2).sqrt();

    // vis-viva at each endpoint, on the circle and on the transfer ellipse
    let circular_1 = (mu_km3_s2 / r1_km).sqrt();
    let circular_2 = (mu_km3_s2 / r2_km).sqrt();
    let ellipse_1 = (mu_km3_s2 * (2.0 / r1_km - 1.0 / sma)).sqrt();
    let ellipse_2 = (mu_km3_s2 * (2.0 / r2_km - 1.0 / sma)).sqrt();

    let dv_depart_m_s = kms_to_ms((ellipse_1 - circular_1).abs());
    let dv_arrive_m_s = kms_to_ms((circular_2 - ellipse_2).abs());

    HohmannEstimate {
        dv_depart_m_s,
        dv_arrive_m_s,
        dv_total_m_s: dv_depart_m_s + dv_arrive_m_s,
        tof_s,
        transfer_sma_km: sma,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_core::constants::AU_KM;

    const MU_SUN: f64 = 1.327_124_400_18e11; // km^3 / s^2

    #[test]
    fn earth_mars_reference_numbers() {
        let h = hohmann_estimate(AU_KM, 1.523_679 * AU_KM, MU_SUN);
        assert!(
            (h.dv_total_m_s - 5_596.0).abs() / 5_596.0 < 1e-3,
            "dv_total = {}",
            h.dv_total_m_s
        );
        let days = h.tof_s / 86_400.0;
        assert!((days - 258.8).abs() < 0.5, "tof_days = {days}");
        assert!((h.transfer_sma_km / AU_KM - 1.261_84).abs() < 1e-3);
    }

    #[test]
    fn earth_venus_reference_numbers() {
        let h = hohmann_estimate(AU_KM, 0.723 * AU_KM, MU_SUN);
        assert!(
            (h.dv_total_m_s - 5_203.0).abs() / 5_203.0 < 2e-3,
            "dv_total = {}",
            h.dv_total_m_s
        );
        // inward transfers price both burns as positive magnitudes too
        assert!(h.dv_depart_m_s > 0.0 && h.dv_arrive_m_s > 0.0);
    }

    #[test]
    fn symmetric_under_endpoint_exchange() {
        let out = hohmann_estimate(AU_KM, 1.524 * AU_KM, MU_SUN);
        let back = hohmann_estimate(1.524 * AU_KM, AU_KM, MU_SUN);
        assert!((out.dv_total_m_s - back.dv_total_m_s).abs() < 1e-9);
        assert!((out.tof_s - back.tof_s).abs() < 1e-6);
        // the periapsis burn of the outward leg is the capture burn coming back
        assert!((out.dv_depart_m_s - back.dv_arrive_m_s).abs() < 1e-9);
        assert!((out.dv_arrive_m_s - back.dv_depart_m_s).abs() < 1e-9);
    }

    #[test]
    fn degenerate_ring_transfer_costs_nothing() {
        let h = hohmann_estimate(AU_KM, AU_KM, MU_SUN);
        assert_eq!(h.dv_total_m_s, 0.0);
        assert!(h.tof_s > 0.0);
    }
}
