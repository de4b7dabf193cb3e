use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const SCENARIO: &str = r#"
auto_interplanetary_edges: true
bodies:
  - id: sun
    mass_kg: 1.98892e30
    mu_km3_s2: 1.32712440018e11
    radius_km: 695700.0
    gravity_m_s2: 274.0
    position: { type: fixed, x_km: 0.0, y_km: 0.0, z_km: 0.0 }
  - id: earth
    mass_kg: 5.9722e24
    mu_km3_s2: 398600.4418
    radius_km: 6371.0
    gravity_m_s2: 9.80665
    soi_radius_km: 924000.0
    position:
      type: keplerian
      semi_major_axis_km: 149598023.0
      eccentricity: 0.01671022
      mean_anomaly_deg: 357.51716
      epoch_jd: 2451545.0
      period_s: 31558149.8
      parent: sun
  - id: mars
    mass_kg: 6.4171e23
    mu_km3_s2: 42828.37
    radius_km: 3389.5
    gravity_m_s2: 3.71
    soi_radius_km: 577000.0
    position:
      type: keplerian
      semi_major_axis_km: 227936637.0
      eccentricity: 0.09341233
      inclination_deg: 1.85061
      raan_deg: 49.57854
      arg_periapsis_deg: 286.4623
      mean_anomaly_deg: 19.41248
      epoch_jd: 2451545.0
      period_s: 59355072.0
      parent: sun
locations:
  orbit_nodes:
    - { id: leo, body: earth, altitude_km: 400.0 }
    - { id: lmo, body: mars, altitude_km: 400.0 }
"#;

#[test]
fn porkchop_writes_grid_and_top_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("scenario.yaml");
    fs::write(&config, SCENARIO).expect("write scenario");
    let grid_csv = dir.path().join("grid.csv");
    let top_csv = dir.path().join("top.csv");

    Command::cargo_bin("porkchop")
        .expect("binary")
        .args([
            "--config",
            config.to_str().unwrap(),
            "--from",
            "earth",
            "--to",
            "mars",
            "--depart",
            "2020-05-01",
            "--span-days",
            "120",
            "--tof-min-days",
            "150",
            "--tof-max-days",
            "300",
            "--grid",
            "5",
            "--max-revs",
            "0",
            "--grid-csv",
            grid_csv.to_str().unwrap(),
            "--top-csv",
            top_csv.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("best window"));

    let grid = fs::read_to_string(&grid_csv).expect("grid csv");
    assert!(grid.starts_with("departure_s,tof_days,dv_total_m_s,feasible"));
    assert_eq!(grid.lines().count(), 26); // header + 5x5 cells

    let top = fs::read_to_string(&top_csv).expect("top csv");
    assert!(top.lines().count() >= 2, "expected at least one ranked row");
}

#[test]
fn route_reports_each_leg() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("scenario.yaml");
    fs::write(&config, SCENARIO).expect("write scenario");

    Command::cargo_bin("route")
        .expect("binary")
        .args([
            "--config",
            config.to_str().unwrap(),
            "--from",
            "leo",
            "--to",
            "lmo",
            "--depart",
            "2020-07-01",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("leo -> lmo"))
        .stdout(predicate::str::contains("total:"));
}

#[test]
fn unknown_location_fails_with_context() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = dir.path().join("scenario.yaml");
    fs::write(&config, SCENARIO).expect("write scenario");

    Command::cargo_bin("route")
        .expect("binary")
        .args([
            "--config",
            config.to_str().unwrap(),
            "--from",
            "leo",
            "--to",
            "atlantis",
            "--depart",
            "2020-07-01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("atlantis"));
}
