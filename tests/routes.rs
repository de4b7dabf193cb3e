use std::sync::Arc;

use orbital_transit::config;
use orbital_transit::ephemeris::{EdgeKind, Registry};
use orbital_transit::routes::{shortest_route, RouteError, RouteGraph};
use orbital_transit::transfer::TransferPlanner;

const EPOCH_2020_07_01: f64 = 646_833_600.0;

fn setup() -> (TransferPlanner, RouteGraph) {
    let doc = config::load_document("configs/solar_system.yaml").expect("scenario");
    let registry = Arc::new(Registry::from_config(&doc).expect("registry"));
    let graph = RouteGraph::build(&registry);
    (TransferPlanner::new(registry), graph)
}

#[test]
fn gateways_are_joined_by_generated_edges() {
    let (_, graph) = setup();
    // seven SOI bodies with parking nodes -> 21 generated pairs + 5 configured
    let interplanetary = graph
        .edges()
        .iter()
        .filter(|edge| edge.kind == EdgeKind::Interplanetary)
        .count();
    assert_eq!(interplanetary, 21);
    assert_eq!(graph.edges().len(), 26);

    let leo_lmo = graph
        .edges()
        .iter()
        .find(|edge| {
            (edge.a == "leo" && edge.b == "lmo") || (edge.a == "lmo" && edge.b == "leo")
        })
        .expect("earth-mars gateway edge");
    // generated edges carry a coplanar-circular seed as fallback metadata
    let seed = leo_lmo.fallback_dv_m_s.expect("seed dv");
    assert!((5_000.0..6_500.0).contains(&seed), "seed {seed}");
    assert!(leo_lmo.fallback_tof_s.expect("seed tof") > 100.0 * 86_400.0);
}

#[test]
fn single_hop_route_prices_the_direct_edge() {
    let (planner, graph) = setup();
    let legs = shortest_route(&planner, &graph, "leo", "lmo", EPOCH_2020_07_01).expect("route");
    assert_eq!(legs.len(), 1);
    assert_eq!(legs[0].from, "leo");
    assert_eq!(legs[0].to, "lmo");
    assert!(legs[0].solution.dv_total_m_s > 0.0);
}

#[test]
fn multi_leg_route_chains_through_the_landing_edge() {
    let (planner, graph) = setup();
    let legs =
        shortest_route(&planner, &graph, "leo", "mars_landing", EPOCH_2020_07_01).expect("route");
    assert!(legs.len() >= 2, "expected at least interplanetary + landing");
    assert_eq!(legs.first().expect("legs").from, "leo");
    assert_eq!(legs.last().expect("legs").to, "mars_landing");
    // consecutive legs must share endpoints
    for pair in legs.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
    // the final hop is the fixed-cost landing
    assert_eq!(legs.last().expect("legs").solution.dv_total_m_s, 1_200.0);
}

#[test]
fn identical_endpoints_yield_an_empty_route() {
    let (planner, graph) = setup();
    let legs = shortest_route(&planner, &graph, "leo", "leo", EPOCH_2020_07_01).expect("route");
    assert!(legs.is_empty());
}

#[test]
fn unreachable_locations_report_no_route() {
    let (planner, graph) = setup();
    // the decorative belt marker has no edges at all
    let err = shortest_route(&planner, &graph, "leo", "belt_marker", EPOCH_2020_07_01)
        .unwrap_err();
    assert!(matches!(err, RouteError::NoRoute { .. }), "{err}");

    let err =
        shortest_route(&planner, &graph, "leo", "atlantis", EPOCH_2020_07_01).unwrap_err();
    assert!(matches!(err, RouteError::Ephemeris(_)), "{err}");
}

#[test]
fn routes_are_deterministic_across_planners() {
    let (planner_a, graph_a) = setup();
    let (planner_b, graph_b) = setup();
    let route_a =
        shortest_route(&planner_a, &graph_a, "leo", "luna_base", EPOCH_2020_07_01).expect("a");
    let route_b =
        shortest_route(&planner_b, &graph_b, "leo", "luna_base", EPOCH_2020_07_01).expect("b");
    assert_eq!(route_a.len(), route_b.len());
    for (a, b) in route_a.iter().zip(&route_b) {
        assert_eq!(a.from, b.from);
        assert_eq!(a.to, b.to);
        assert!(a.solution.dv_total_m_s == b.solution.dv_total_m_s);
    }
}
