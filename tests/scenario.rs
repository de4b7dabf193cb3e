use orbital_transit::config::{self, ConfigError};
use orbital_transit::ephemeris::Registry;

#[test]
fn shipped_scenario_loads_and_builds() {
    let doc = config::load_document("configs/solar_system.yaml").expect("scenario");
    assert!(doc.auto_interplanetary_edges);
    assert!(doc.bodies.len() >= 9);
    assert_eq!(doc.locations.orbit_nodes.len(), 8);
    assert_eq!(doc.locations.surface_sites.len(), 2);
    assert_eq!(doc.locations.lagrange_points.len(), 2);

    let registry = Registry::from_config(&doc).expect("registry");
    assert_eq!(registry.central_body().id, "sun");
    assert_eq!(registry.gateway("earth").expect("gateway").id, "leo");
    assert_eq!(registry.gateway("mars").expect("gateway").id, "lmo");
    // lowest-altitude fallback when no override is configured
    assert_eq!(registry.gateway("moon").expect("gateway").id, "llo");
}

#[test]
fn broken_documents_leave_no_registry_behind() {
    let doc = config::from_yaml_str(
        r#"
bodies:
  - id: sun
    mass_kg: 1.0e30
    mu_km3_s2: 1.0e11
    radius_km: 600000.0
    gravity_m_s2: 274.0
    position: { type: fixed, x_km: 0.0, y_km: 0.0, z_km: 0.0 }
  - id: rogue
    mass_kg: 1.0e24
    mu_km3_s2: 1.0e5
    radius_km: 6000.0
    gravity_m_s2: 9.0
    position:
      type: keplerian
      semi_major_axis_km: 1.0e8
      eccentricity: 0.1
      mean_anomaly_deg: 0.0
      epoch_jd: 2451545.0
      period_s: 3.0e7
      parent: ghost
"#,
    );
    match doc {
        Err(ConfigError::Validation { path, reason }) => {
            assert!(path.contains("bodies[1]"), "{path}");
            assert!(reason.contains("ghost"), "{reason}");
        }
        other => panic!("expected a validation failure, got {other:?}"),
    }
}

#[test]
fn version_is_exposed_for_smoke_checks() {
    assert!(!orbital_transit::version().is_empty());
}
