use orbital_transit::config;
use orbital_transit::core::vector;
use orbital_transit::ephemeris::{EphemerisError, Registry};

fn registry() -> Registry {
    let doc = config::load_document("configs/solar_system.yaml").expect("scenario");
    Registry::from_config(&doc).expect("registry")
}

#[test]
fn scenario_contains_the_major_bodies() {
    let reg = registry();
    for id in ["sun", "mercury", "venus", "earth", "moon", "mars", "jupiter", "saturn"] {
        assert!(reg.body(id).is_ok(), "missing body {id}");
    }
    let earth = reg.body("earth").unwrap();
    assert!(earth.mass_kg > 5.9e24 && earth.mass_kg < 6.1e24);
    assert!(earth.has_soi());
    assert_eq!(reg.central_body().id, "sun");
    assert_eq!(reg.central_mu(), 1.32712440018e11);
}

#[test]
fn states_repeat_after_one_orbital_period() {
    let reg = registry();
    let cases = [
        ("mercury", 7_600_521.6),
        ("venus", 19_414_166.4),
        ("earth", 31_558_149.8),
        ("mars", 59_355_072.0),
        ("moon", 2_360_591.5),
    ];
    for (body, period_s) in cases {
        let t0 = 1.0e7;
        let s0 = reg.body_state(body, t0).expect("state");
        let s1 = reg.body_state(body, t0 + period_s).expect("state");
        let dr = vector::norm(&vector::sub(&s1.position_km, &s0.position_km));
        let dv = vector::norm(&vector::sub(&s1.velocity_km_s, &s0.velocity_km_s));
        assert!(dr < 1.0, "{body}: position drift {dr} km over one period");
        assert!(dv < 1.0e-6, "{body}: velocity drift {dv} km/s over one period");
    }
}

#[test]
fn planet_distances_stay_near_their_semi_major_axes() {
    let reg = registry();
    for (body, sma_km, ecc) in [
        ("earth", 149_598_023.0, 0.0167),
        ("mars", 227_936_637.0, 0.0934),
        ("jupiter", 778_412_027.0, 0.0484),
    ] {
        for step in 0..8 {
            let epoch = step as f64 * 5.0e7;
            let state = reg.body_state(body, epoch).expect("state");
            let r = vector::norm(&state.position_km);
            let lo = sma_km * (1.0 - ecc) * 0.999;
            let hi = sma_km * (1.0 + ecc) * 1.001;
            assert!(
                (lo..hi).contains(&r),
                "{body} at {epoch}: r = {r} outside [{lo}, {hi}]"
            );
        }
    }
}

#[test]
fn moon_accumulates_earths_heliocentric_state() {
    let reg = registry();
    let epoch = 646_833_600.0; // 2020-07-01
    let earth = reg.body_state("earth", epoch).expect("earth");
    let moon = reg.body_state("moon", epoch).expect("moon");
    let range = vector::norm(&vector::sub(&moon.position_km, &earth.position_km));
    assert!(
        (356_000.0..407_000.0).contains(&range),
        "earth-moon range {range} km"
    );
    // the moon's heliocentric speed stays within ~1.1 km/s of Earth's
    let rel_speed = vector::norm(&vector::sub(&moon.velocity_km_s, &earth.velocity_km_s));
    assert!((0.9..1.2).contains(&rel_speed), "relative speed {rel_speed}");
}

#[test]
fn lagrange_points_sit_in_the_expected_geometry() {
    let reg = registry();
    let epoch = 3.0e8;
    let earth = reg.body_state("earth", epoch).expect("earth");
    let moon = reg.body_state("moon", epoch).expect("moon");
    let d = vector::norm(&vector::sub(&moon.position_km, &earth.position_km));

    let l1 = reg.location_state("earth_moon_l1", epoch).expect("l1");
    let l1_from_earth = vector::norm(&vector::sub(&l1.position_km, &earth.position_km));
    assert!(
        (0.8..0.9).contains(&(l1_from_earth / d)),
        "L1 at {} of the separation",
        l1_from_earth / d
    );

    let l4 = reg.location_state("sun_earth_l4", epoch).expect("l4");
    let l4_from_sun = vector::norm(&l4.position_km);
    let earth_from_sun = vector::norm(&earth.position_km);
    assert!(
        ((l4_from_sun - earth_from_sun) / earth_from_sun).abs() < 1e-9,
        "L4 orbits at Earth's heliocentric distance"
    );
}

#[test]
fn unknown_ids_surface_typed_errors() {
    let reg = registry();
    assert!(matches!(
        reg.body_state("nibiru", 0.0),
        Err(EphemerisError::UnknownBody(id)) if id == "nibiru"
    ));
    assert!(matches!(
        reg.location_state("nibiru_station", 0.0),
        Err(EphemerisError::UnknownLocation(_))
    ));
}
