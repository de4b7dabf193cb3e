//! Leg solution record and the quality score shared by planner and scanner.

use serde::{Deserialize, Serialize};
use transit_core::time::seconds_to_days;
use transit_core::vector::Vector3;
use transit_impulsive::lambert::PathKind;

/// Game-design tuning weight: one day of flight time costs this many m/s of
/// equivalent delta-v in the quality score.
pub const TOF_WEIGHT_M_S_PER_DAY: f64 = 1.0;
/// Game-design tuning weight: each full revolution costs this many m/s.
pub const REV_PENALTY_M_S: f64 = 50.0;

/// Scalar ranking used everywhere a single best branch must be chosen.
pub fn quality_score(dv_total_m_s: f64, tof_s: f64, revolutions: u32) -> f64 {
    dv_total_m_s
        + TOF_WEIGHT_M_S_PER_DAY * seconds_to_days(tof_s)
        + REV_PENALTY_M_S * revolutions as f64
}

/// Result of evaluating one transfer edge at one departure epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegSolution {
    pub dv_total_m_s: f64,
    pub dv_depart_m_s: f64,
    pub dv_arrive_m_s: f64,
    pub tof_s: f64,
    pub departure_epoch_s: f64,
    pub arrival_epoch_s: f64,
    pub revolutions: u32,
    pub path_kind: PathKind,
    pub quality_score: f64,
    /// Heliocentric departure position of the transfer arc, carried so
    /// callers can sample the trajectory without re-solving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helio_r1_km: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helio_v1_km_s: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helio_mu_km3_s2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_inf_depart_km_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_inf_arrive_km_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_km: Option<Vec<Vector3>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_score_weights_are_additive() {
        let base = quality_score(3_000.0, 0.0, 0);
        assert_eq!(base, 3_000.0);
        assert_eq!(
            quality_score(3_000.0, 86_400.0, 0) - base,
            TOF_WEIGHT_M_S_PER_DAY
        );
        assert_eq!(quality_score(3_000.0, 0.0, 2) - base, 2.0 * REV_PENALTY_M_S);
    }
}
