//! Patched-conic helpers for converting hyperbolic excess into parking-orbit burns.

/// Circular orbital speed at `radius_km` about a body with parameter `mu_km3_s2`.
pub fn circular_speed(mu_km3_s2: f64, radius_km: f64) -> f64 {
    (mu_km3_s2 / radius_km).sqrt()
}

/// Patched-conic escape delta-v from a circular parking orbit.
///
/// The burn raises the parking-orbit speed onto the hyperbola whose excess
/// speed at the sphere of influence is `vinf_km_s`.
pub fn escape_delta_v(mu_km3_s2: f64, parking_radius_km: f64, vinf_km_s: f64) -> f64 {
    let circular = circular_speed(mu_km3_s2, parking_radius_km);
    let hyperbolic = (vinf_km_s * vinf_km_s + 2.0 * mu_km3_s2 / parking_radius_km).sqrt();
    (hyperbolic - circular).max(0.0)
}

/// Patched-conic capture delta-v into a circular parking orbit.
pub fn capture_delta_v(mu_km3_s2: f64, parking_radius_km: f64, vinf_km_s: f64) -> f64 {
    let circular = circular_speed(mu_km3_s2, parking_radius_km);
    let hyperbolic = (vinf_km_s * vinf_km_s + 2.0 * mu_km3_s2 / parking_radius_km).sqrt();
    (hyperbolic - circular).max(0.0)
}
