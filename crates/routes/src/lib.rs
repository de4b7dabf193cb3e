//! Static route topology and shortest-route search.
//!
//! The graph is the union of configured edges and, when enabled, generated
//! interplanetary edges between body gateways. Topology is static; dynamic
//! leg costs are obtained from the planner per departure epoch and never
//! stored in the graph.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use thiserror::Error;
use transit_ephemeris::{EdgeKind, EphemerisError, Registry, TransferEdge};
use transit_impulsive::transfers::hohmann_estimate;
use transit_transfer::{TransferError, TransferPlanner};

/// Errors surfaced by route queries.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error("no route between `{from}` and `{to}`")]
    NoRoute { from: String, to: String },
}

/// One priced step of a route.
#[derive(Debug, Clone)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    pub solution: transit_transfer::LegSolution,
}

/// Union of configured and generated edges, with adjacency per location.
#[derive(Debug)]
pub struct RouteGraph {
    edges: Vec<TransferEdge>,
    adjacency: HashMap<String, Vec<usize>>,
}

impl RouteGraph {
    /// Build the topology for a registry snapshot.
    pub fn build(registry: &Registry) -> Self {
        let mut edges: Vec<TransferEdge> = registry.edges().to_vec();
        if registry.auto_interplanetary_edges() {
            generate_interplanetary_edges(registry, &mut edges);
        }

        let mut adjacency: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, edge) in edges.iter().enumerate() {
            adjacency.entry(edge.a.clone()).or_default().push(index);
            adjacency.entry(edge.b.clone()).or_default().push(index);
        }
        Self { edges, adjacency }
    }

    pub fn edges(&self) -> &[TransferEdge] {
        &self.edges
    }

    /// Locations reachable in one hop from `location`.
    pub fn neighbors<'a>(
        &'a self,
        location: &'a str,
    ) -> impl Iterator<Item = (&'a TransferEdge, &'a str)> + 'a {
        self.adjacency
            .get(location)
            .into_iter()
            .flatten()
            .map(move |&index| {
                let edge = &self.edges[index];
                let other = if edge.a == location { &edge.b } else { &edge.a };
                (edge, other.as_str())
            })
    }
}

/// Bidirectional gateway-to-gateway edges for every pair of SOI-bearing
/// bodies with a parking node, seeded with a coplanar-circular estimate as
/// fallback metadata.
fn generate_interplanetary_edges(registry: &Registry, edges: &mut Vec<TransferEdge>) {
    let mut gateways: Vec<(&str, &str)> = registry
        .bodies()
        .filter(|body| body.has_soi())
        .filter_map(|body| {
            registry
                .gateway(&body.id)
                .map(|gateway| (body.id.as_str(), gateway.id.as_str()))
        })
        .collect();
    gateways.sort();

    let mut generated = 0usize;
    for (i, (body_a, gate_a)) in gateways.iter().enumerate() {
        for (body_b, gate_b) in gateways.iter().skip(i + 1) {
            let already_connected = edges.iter().any(|edge| {
                edge.kind == EdgeKind::Interplanetary
                    && ((edge.a == *gate_a && edge.b == *gate_b)
                        || (edge.a == *gate_b && edge.b == *gate_a))
            });
            if already_connected {
                continue;
            }
            let seed = match (
                registry.heliocentric_sma_km(body_a),
                registry.heliocentric_sma_km(body_b),
            ) {
                (Ok(sma_a), Ok(sma_b)) if sma_a > 0.0 && sma_b > 0.0 && sma_a != sma_b => {
                    Some(hohmann_estimate(sma_a, sma_b, registry.central_mu()))
                }
                _ => None,
            };
            edges.push(TransferEdge {
                a: gate_a.to_string(),
                b: gate_b.to_string(),
                kind: EdgeKind::Interplanetary,
                fallback_dv_m_s: seed.map(|h| h.dv_total_m_s),
                fallback_tof_s: seed.map(|h| h.tof_s),
            });
            generated += 1;
        }
    }
    if generated > 0 {
        log::debug!("generated {generated} interplanetary gateway edges");
    }
}

struct QueueEntry {
    cost_m_s: f64,
    location: String,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost_m_s == other.cost_m_s && self.location == other.location
    }
}
impl Eq for QueueEntry {}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueEntry {
    // reversed so the max-heap pops the cheapest node; id breaks ties for
    // deterministic visitation order
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost_m_s
            .total_cmp(&self.cost_m_s)
            .then_with(|| other.location.cmp(&self.location))
    }
}

/// Cheapest multi-leg route by total delta-v at one departure epoch.
///
/// Every leg is priced at `departure_epoch_s`. Edges the planner reports as
/// infeasible fall back to their static metadata when present and are
/// otherwise skipped.
pub fn shortest_route(
    planner: &TransferPlanner,
    graph: &RouteGraph,
    from: &str,
    to: &str,
    departure_epoch_s: f64,
) -> Result<Vec<RouteLeg>, RouteError> {
    let registry = planner.registry();
    registry.location(from)?;
    registry.location(to)?;
    if from == to {
        return Ok(Vec::new());
    }

    let mut best_cost: HashMap<String, f64> = HashMap::new();
    let mut previous: HashMap<String, (String, transit_transfer::LegSolution)> = HashMap::new();
    let mut queue = BinaryHeap::new();
    best_cost.insert(from.to_string(), 0.0);
    queue.push(QueueEntry {
        cost_m_s: 0.0,
        location: from.to_string(),
    });

    while let Some(QueueEntry { cost_m_s, location }) = queue.pop() {
        if location == to {
            break;
        }
        if best_cost
            .get(&location)
            .is_some_and(|&known| cost_m_s > known)
        {
            continue;
        }
        for (edge, neighbor) in graph.neighbors(&location) {
            let Some(solution) = price_edge(planner, edge, &location, neighbor, departure_epoch_s)?
            else {
                continue;
            };
            let next_cost = cost_m_s + solution.dv_total_m_s;
            let improves = best_cost
                .get(neighbor)
                .map(|&known| next_cost < known)
                .unwrap_or(true);
            if improves {
                best_cost.insert(neighbor.to_string(), next_cost);
                previous.insert(neighbor.to_string(), (location.clone(), solution));
                queue.push(QueueEntry {
                    cost_m_s: next_cost,
                    location: neighbor.to_string(),
                });
            }
        }
    }

    if !previous.contains_key(to) {
        return Err(RouteError::NoRoute {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let mut legs = Vec::new();
    let mut cursor = to.to_string();
    while cursor != from {
        let Some((parent, solution)) = previous.get(&cursor).cloned() else {
            break;
        };
        legs.push(RouteLeg {
            from: parent.clone(),
            to: cursor,
            solution,
        });
        cursor = parent;
    }
    legs.reverse();
    Ok(legs)
}

/// Price one edge, mapping `NoFeasibleTransfer` to the edge's fallback
/// metadata when present.
fn price_edge(
    planner: &TransferPlanner,
    edge: &TransferEdge,
    from: &str,
    to: &str,
    departure_epoch_s: f64,
) -> Result<Option<transit_transfer::LegSolution>, RouteError> {
    match planner.solve_leg(from, to, departure_epoch_s, 0.0) {
        Ok(solution) => Ok(Some(solution)),
        Err(TransferError::NoFeasibleTransfer { .. }) => {
            match (edge.fallback_dv_m_s, edge.fallback_tof_s) {
                (Some(dv_m_s), Some(tof_s)) => {
                    log::debug!("edge {from} -> {to} fell back to static estimate");
                    Ok(Some(fallback_solution(dv_m_s, tof_s, departure_epoch_s)))
                }
                _ => Ok(None),
            }
        }
        Err(err) => Err(err.into()),
    }
}

fn fallback_solution(
    dv_m_s: f64,
    tof_s: f64,
    departure_epoch_s: f64,
) -> transit_transfer::LegSolution {
    transit_transfer::LegSolution {
        dv_total_m_s: dv_m_s,
        dv_depart_m_s: dv_m_s,
        dv_arrive_m_s: 0.0,
        tof_s,
        departure_epoch_s,
        arrival_epoch_s: departure_epoch_s + tof_s,
        revolutions: 0,
        path_kind: transit_impulsive::lambert::PathKind::Short,
        quality_score: transit_transfer::quality_score(dv_m_s, tof_s, 0),
        helio_r1_km: None,
        helio_v1_km_s: None,
        helio_mu_km3_s2: None,
        v_inf_depart_km_s: None,
        v_inf_arrive_km_s: None,
        trajectory_km: None,
    }
}
