use std::sync::Arc;

use orbital_transit::config;
use orbital_transit::ephemeris::Registry;
use orbital_transit::transfer::{TransferError, TransferPlanner};

const EPOCH_2020_06_01: f64 = 644_241_600.0;
const EPOCH_2020_07_01: f64 = 646_833_600.0;
const DAY_S: f64 = 86_400.0;

fn planner() -> TransferPlanner {
    let doc = config::load_document("configs/solar_system.yaml").expect("scenario");
    TransferPlanner::new(Arc::new(Registry::from_config(&doc).expect("registry")))
}

#[test]
fn local_leg_is_a_closed_form_hohmann() {
    let planner = planner();
    let leg = planner
        .solve_leg("leo", "geo", EPOCH_2020_07_01, 0.0)
        .expect("leg");
    // textbook LEO -> GEO: ~3.85 km/s over ~5.25 hours
    assert!(
        (3_700.0..4_000.0).contains(&leg.dv_total_m_s),
        "dv {}",
        leg.dv_total_m_s
    );
    assert!(
        (5.0 * 3_600.0..5.5 * 3_600.0).contains(&leg.tof_s),
        "tof {}",
        leg.tof_s
    );
    assert_eq!(leg.revolutions, 0);
    assert!(leg.helio_r1_km.is_none(), "local legs carry no heliocentric arc");

    // same-body legs are epoch-independent
    let later = planner
        .solve_leg("leo", "geo", EPOCH_2020_07_01 + 37.0 * DAY_S, 0.0)
        .expect("leg");
    assert_eq!(later.dv_total_m_s, leg.dv_total_m_s);
}

#[test]
fn landing_and_lagrange_edges_use_static_costs() {
    let planner = planner();
    let landing = planner
        .solve_leg("lmo", "mars_landing", EPOCH_2020_07_01, 0.0)
        .expect("landing");
    assert_eq!(landing.dv_total_m_s, 1_200.0);
    assert_eq!(landing.tof_s, 21_600.0);

    let lagrange = planner
        .solve_leg("leo", "earth_moon_l1", EPOCH_2020_07_01, 0.0)
        .expect("lagrange");
    assert_eq!(lagrange.dv_total_m_s, 3_200.0);
    assert_eq!(lagrange.tof_s, 345_600.0);
}

#[test]
fn earth_mars_2020_window_patched_conic() {
    let planner = planner();
    let mut best: Option<orbital_transit::transfer::LegSolution> = None;
    // weekly departures across the summer window
    for week in 0..14 {
        let departure = EPOCH_2020_06_01 + week as f64 * 7.0 * DAY_S;
        let leg = planner.solve_leg("leo", "lmo", departure, 0.0).expect("leg");
        let better = best
            .as_ref()
            .map(|b| leg.dv_total_m_s < b.dv_total_m_s)
            .unwrap_or(true);
        if better {
            best = Some(leg);
        }
    }
    let best = best.expect("some window");

    // departure burn from a 400 km parking orbit sits in the published band
    assert!(
        (3_400.0..4_300.0).contains(&best.dv_depart_m_s),
        "dv_depart {}",
        best.dv_depart_m_s
    );
    // arrival capture into a 400 km areocentric orbit adds ~2 km/s
    assert!(
        (5_200.0..6_800.0).contains(&best.dv_total_m_s),
        "dv_total {}",
        best.dv_total_m_s
    );
    assert!(best.v_inf_depart_km_s.expect("vinf") < 5.0);
    assert!(best.helio_r1_km.is_some() && best.helio_mu_km3_s2.is_some());
    assert!((100.0 * DAY_S..500.0 * DAY_S).contains(&best.tof_s));
}

#[test]
fn extra_margin_is_exactly_additive() {
    let planner = planner();
    let base = planner
        .solve_leg("leo", "lmo", EPOCH_2020_07_01, 0.0)
        .expect("base");
    let padded = planner
        .solve_leg("leo", "lmo", EPOCH_2020_07_01, 500.0)
        .expect("padded");
    assert!(
        (padded.dv_total_m_s - base.dv_total_m_s - 500.0).abs() < 1e-9,
        "margin must pass through unchanged: {} vs {}",
        base.dv_total_m_s,
        padded.dv_total_m_s
    );
    assert_eq!(base.dv_depart_m_s, padded.dv_depart_m_s);
    assert_eq!(base.tof_s, padded.tof_s);
}

#[test]
fn cache_returns_bit_identical_results() {
    let cached = planner();
    let first = cached
        .solve_leg("leo", "lmo", EPOCH_2020_07_01, 0.0)
        .expect("first");
    let second = cached
        .solve_leg("leo", "lmo", EPOCH_2020_07_01, 0.0)
        .expect("second");

    let fresh = planner();
    let uncached = fresh
        .solve_leg("leo", "lmo", EPOCH_2020_07_01, 0.0)
        .expect("uncached");

    for (label, a, b) in [
        ("repeat", first.dv_total_m_s, second.dv_total_m_s),
        ("fresh", first.dv_total_m_s, uncached.dv_total_m_s),
    ] {
        assert!(a == b, "{label}: {a} != {b}");
    }
    assert!(first.tof_s == second.tof_s && first.tof_s == uncached.tof_s);
    assert!(first.quality_score == uncached.quality_score);

    let stats = cached.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn reload_swaps_the_registry_and_clears_the_cache() {
    let planner = planner();
    planner
        .solve_leg("leo", "lmo", EPOCH_2020_07_01, 0.0)
        .expect("warm the cache");
    assert_eq!(planner.cache_stats().entries, 1);

    let doc = config::load_document("configs/solar_system.yaml").expect("scenario");
    planner.reload(Arc::new(Registry::from_config(&doc).expect("registry")));
    let stats = planner.cache_stats();
    assert_eq!(stats.entries, 0, "reload must clear the cache");

    planner
        .solve_leg("leo", "lmo", EPOCH_2020_07_01, 0.0)
        .expect("resolves after reload");
}

#[test]
fn client_errors_are_typed() {
    let planner = planner();
    assert!(matches!(
        planner.solve_leg("leo", "leo", 0.0, 0.0),
        Err(TransferError::InvalidRequest { .. })
    ));
    assert!(matches!(
        planner.solve_leg("leo", "xanadu", 0.0, 0.0),
        Err(TransferError::Ephemeris(_))
    ));
}
