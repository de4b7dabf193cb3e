//! Leg pricing over the registry: closed-form same-body branches and the
//! Lambert-based interplanetary branch with its time-of-flight sweep.

use std::sync::{Arc, RwLock};

use transit_core::time::seconds_to_days;
use transit_core::units::kms_to_ms;
use transit_core::vector;
use transit_ephemeris::{EdgeKind, Location, Registry, ResolvedLocation, TransferEdge};
use transit_impulsive::lambert::{self, PathKind};
use transit_impulsive::transfers::{hohmann_estimate, HohmannEstimate};
use transit_orbits::{capture_delta_v, escape_delta_v};

use crate::cache::{CacheStats, LegCache, LegKey};
use crate::trajectory::compute_trajectory_points;
use crate::types::{quality_score, LegSolution};
use crate::TransferError;

/// Number of time-of-flight candidates evaluated per interplanetary leg.
pub const TOF_SWEEP_COUNT: usize = 14;
/// Sweep lower bound as a fraction of the Hohmann anchor time.
pub const TOF_SWEEP_MIN_FACTOR: f64 = 0.3;
/// Sweep upper bound as a fraction of the Hohmann anchor time.
pub const TOF_SWEEP_MAX_FACTOR: f64 = 2.5;

/// Planning service: immutable registry snapshot plus the process-wide leg
/// cache. Reloading swaps the snapshot atomically and clears the cache.
#[derive(Debug)]
pub struct TransferPlanner {
    registry: RwLock<Arc<Registry>>,
    cache: LegCache,
}

impl TransferPlanner {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry: RwLock::new(registry),
            cache: LegCache::new(),
        }
    }

    /// Current registry snapshot.
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.read().unwrap().clone()
    }

    /// Replace the registry and invalidate every cached leg.
    ///
    /// The swap and the clear run under the registry write lock, so no
    /// lookup can observe the new registry with stale cache contents.
    pub fn reload(&self, registry: Arc<Registry>) {
        let mut guard = self.registry.write().unwrap();
        *guard = registry;
        self.cache.clear();
        log::info!("registry reloaded; planner cache invalidated");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Price one leg at the given departure epoch.
    ///
    /// `extra_dv_m_s` is a caller-supplied margin added verbatim to the
    /// total. Results are memoised per location pair and hour bucket.
    pub fn solve_leg(
        &self,
        from: &str,
        to: &str,
        departure_epoch_s: f64,
        extra_dv_m_s: f64,
    ) -> Result<LegSolution, TransferError> {
        let key = LegKey::new(from, to, departure_epoch_s, extra_dv_m_s);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let registry = self.registry();
        let solution =
            solve_leg_uncached(&registry, from, to, departure_epoch_s, extra_dv_m_s, 0)?;
        self.cache.insert(key, solution.clone());
        Ok(solution)
    }

    /// Price a leg and attach a sampled heliocentric polyline.
    pub fn solve_leg_with_trajectory(
        &self,
        from: &str,
        to: &str,
        departure_epoch_s: f64,
        extra_dv_m_s: f64,
        samples: usize,
    ) -> Result<LegSolution, TransferError> {
        let mut leg = self.solve_leg(from, to, departure_epoch_s, extra_dv_m_s)?;
        self.attach_trajectory(&mut leg, samples)?;
        Ok(leg)
    }

    /// Sample the heliocentric arc carried by an interplanetary leg.
    pub fn attach_trajectory(
        &self,
        leg: &mut LegSolution,
        samples: usize,
    ) -> Result<(), TransferError> {
        let (Some(r1), Some(v1), Some(mu)) =
            (leg.helio_r1_km, leg.helio_v1_km_s, leg.helio_mu_km3_s2)
        else {
            return Err(TransferError::InvalidRequest {
                reason: "leg carries no heliocentric arc to sample".to_string(),
            });
        };
        leg.trajectory_km = Some(compute_trajectory_points(&r1, &v1, mu, leg.tof_s, samples)?);
        Ok(())
    }
}

/// Uncached leg evaluation; `max_revs` is zero for direct queries and raised
/// by the porkchop scanner.
pub(crate) fn solve_leg_uncached(
    registry: &Registry,
    from: &str,
    to: &str,
    departure_epoch_s: f64,
    extra_dv_m_s: f64,
    max_revs: u32,
) -> Result<LegSolution, TransferError> {
    let from_loc = registry.location(from)?;
    let to_loc = registry.location(to)?;
    if from_loc.id == to_loc.id {
        return Err(TransferError::InvalidRequest {
            reason: format!("leg endpoints are both `{from}`"),
        });
    }

    if let Some(edge) = find_edge(registry, from, to) {
        match edge.kind {
            EdgeKind::Landing => {
                return landing_leg(from_loc, to_loc, edge, departure_epoch_s, extra_dv_m_s);
            }
            EdgeKind::Lagrange => {
                return static_leg(edge, departure_epoch_s, extra_dv_m_s);
            }
            EdgeKind::Local | EdgeKind::Interplanetary => {}
        }
    }

    if from_loc.body_id == to_loc.body_id {
        local_leg(registry, from_loc, to_loc, departure_epoch_s, extra_dv_m_s)
    } else {
        interplanetary_leg(
            registry,
            from_loc,
            to_loc,
            departure_epoch_s,
            extra_dv_m_s,
            max_revs,
        )
    }
}

fn find_edge<'a>(registry: &'a Registry, a: &str, b: &str) -> Option<&'a TransferEdge> {
    registry
        .edges()
        .iter()
        .find(|edge| (edge.a == a && edge.b == b) || (edge.a == b && edge.b == a))
}

/// Fixed-cost leg priced from surface-site metadata or the edge override.
fn landing_leg(
    from_loc: &ResolvedLocation,
    to_loc: &ResolvedLocation,
    edge: &TransferEdge,
    departure_epoch_s: f64,
    extra_dv_m_s: f64,
) -> Result<LegSolution, TransferError> {
    let site = [from_loc, to_loc].into_iter().find_map(|loc| {
        if let Location::SurfaceSite {
            landing_dv_m_s,
            landing_tof_s,
            ..
        } = &loc.location
        {
            Some((*landing_dv_m_s, *landing_tof_s))
        } else {
            None
        }
    });
    let (dv, tof) = match (edge.fallback_dv_m_s, edge.fallback_tof_s, site) {
        (Some(dv), Some(tof), _) => (dv, tof),
        (_, _, Some(site)) => site,
        _ => {
            return Err(TransferError::InvalidRequest {
                reason: format!(
                    "landing edge `{}`-`{}` has neither a surface site nor static costs",
                    edge.a, edge.b
                ),
            });
        }
    };
    Ok(fixed_cost_leg(dv, tof, departure_epoch_s, extra_dv_m_s))
}

/// Low-energy static leg: costs come from the edge metadata.
fn static_leg(
    edge: &TransferEdge,
    departure_epoch_s: f64,
    extra_dv_m_s: f64,
) -> Result<LegSolution, TransferError> {
    match (edge.fallback_dv_m_s, edge.fallback_tof_s) {
        (Some(dv), Some(tof)) => Ok(fixed_cost_leg(dv, tof, departure_epoch_s, extra_dv_m_s)),
        _ => Err(TransferError::InvalidRequest {
            reason: format!("edge `{}`-`{}` carries no static costs", edge.a, edge.b),
        }),
    }
}

fn fixed_cost_leg(
    dv_m_s: f64,
    tof_s: f64,
    departure_epoch_s: f64,
    extra_dv_m_s: f64,
) -> LegSolution {
    let dv_total = dv_m_s + extra_dv_m_s;
    LegSolution {
        dv_total_m_s: dv_total,
        dv_depart_m_s: dv_m_s,
        dv_arrive_m_s: 0.0,
        tof_s,
        departure_epoch_s,
        arrival_epoch_s: departure_epoch_s + tof_s,
        revolutions: 0,
        path_kind: PathKind::Short,
        quality_score: quality_score(dv_total, tof_s, 0),
        helio_r1_km: None,
        helio_v1_km_s: None,
        helio_mu_km3_s2: None,
        v_inf_depart_km_s: None,
        v_inf_arrive_km_s: None,
        trajectory_km: None,
    }
}

/// Same-body leg: coplanar circular-to-circular Hohmann, not time-dependent.
fn local_leg(
    registry: &Registry,
    from_loc: &ResolvedLocation,
    to_loc: &ResolvedLocation,
    departure_epoch_s: f64,
    extra_dv_m_s: f64,
) -> Result<LegSolution, TransferError> {
    let body = registry.body(&from_loc.body_id)?;
    let estimate = hohmann_estimate(from_loc.park_radius_km, to_loc.park_radius_km, body.mu_km3_s2);
    let dv_total = estimate.dv_total_m_s + extra_dv_m_s;
    Ok(LegSolution {
        dv_total_m_s: dv_total,
        dv_depart_m_s: estimate.dv_depart_m_s,
        dv_arrive_m_s: estimate.dv_arrive_m_s,
        tof_s: estimate.tof_s,
        departure_epoch_s,
        arrival_epoch_s: departure_epoch_s + estimate.tof_s,
        revolutions: 0,
        path_kind: PathKind::Short,
        quality_score: quality_score(dv_total, estimate.tof_s, 0),
        helio_r1_km: None,
        helio_v1_km_s: None,
        helio_mu_km3_s2: None,
        v_inf_depart_km_s: None,
        v_inf_arrive_km_s: None,
        trajectory_km: None,
    })
}

/// Cross-body leg: sweep candidate flight times around the Hohmann anchor
/// and keep the best-scoring Lambert branch.
fn interplanetary_leg(
    registry: &Registry,
    from_loc: &ResolvedLocation,
    to_loc: &ResolvedLocation,
    departure_epoch_s: f64,
    extra_dv_m_s: f64,
    max_revs: u32,
) -> Result<LegSolution, TransferError> {
    let anchor = hohmann_anchor(registry, from_loc, to_loc)?;

    let mut best: Option<LegSolution> = None;
    let ratio = TOF_SWEEP_MAX_FACTOR / TOF_SWEEP_MIN_FACTOR;
    for k in 0..TOF_SWEEP_COUNT {
        let factor =
            TOF_SWEEP_MIN_FACTOR * ratio.powf(k as f64 / (TOF_SWEEP_COUNT - 1) as f64);
        let tof_s = factor * anchor.tof_s;
        let candidate = evaluate_interplanetary_at_tof(
            registry,
            from_loc,
            to_loc,
            departure_epoch_s,
            tof_s,
            extra_dv_m_s,
            max_revs,
        )?;
        if let Some(leg) = candidate {
            let better = best
                .as_ref()
                .map(|b| leg.quality_score < b.quality_score)
                .unwrap_or(true);
            if better {
                best = Some(leg);
            }
        }
    }

    best.ok_or_else(|| {
        log::debug!(
            "no lambert branch converged for {} -> {} at {:.1} d",
            from_loc.id,
            to_loc.id,
            seconds_to_days(departure_epoch_s)
        );
        TransferError::NoFeasibleTransfer {
            hohmann_dv_m_s: anchor.dv_total_m_s,
            hohmann_tof_s: anchor.tof_s,
        }
    })
}

/// Heliocentric coplanar-circular estimate between the two owning bodies,
/// used as the sweep anchor and as the infeasibility floor.
pub(crate) fn hohmann_anchor(
    registry: &Registry,
    from_loc: &ResolvedLocation,
    to_loc: &ResolvedLocation,
) -> Result<HohmannEstimate, TransferError> {
    let sma_from = registry.heliocentric_sma_km(&from_loc.body_id)?;
    let sma_to = registry.heliocentric_sma_km(&to_loc.body_id)?;
    if !(sma_from > 0.0) || !(sma_to > 0.0) {
        return Err(TransferError::InvalidRequest {
            reason: "the central body cannot be an interplanetary endpoint".to_string(),
        });
    }
    Ok(hohmann_estimate(sma_from, sma_to, registry.central_mu()))
}

/// Evaluate one interplanetary candidate at an exact time of flight.
///
/// Returns `Ok(None)` when no Lambert branch converges for this geometry.
pub(crate) fn evaluate_interplanetary_at_tof(
    registry: &Registry,
    from_loc: &ResolvedLocation,
    to_loc: &ResolvedLocation,
    departure_epoch_s: f64,
    tof_s: f64,
    extra_dv_m_s: f64,
    max_revs: u32,
) -> Result<Option<LegSolution>, TransferError> {
    if !(tof_s > 0.0) {
        return Ok(None);
    }
    let body_from = registry.body(&from_loc.body_id)?;
    let body_to = registry.body(&to_loc.body_id)?;
    let mu_sun = registry.central_mu();
    let depart_state = registry.body_state(&body_from.id, departure_epoch_s)?;
    let arrive_state = registry.body_state(&body_to.id, departure_epoch_s + tof_s)?;

    let branches = lambert::solve(
        &depart_state.position_km,
        &arrive_state.position_km,
        tof_s,
        mu_sun,
        max_revs,
        false,
    );

    let mut best: Option<LegSolution> = None;
    for branch in branches {
        let v_inf_depart = vector::norm(&vector::sub(
            &branch.v1_km_s,
            &depart_state.velocity_km_s,
        ));
        let v_inf_arrive = vector::norm(&vector::sub(
            &branch.v2_km_s,
            &arrive_state.velocity_km_s,
        ));
        let dv_depart =
            kms_to_ms(escape_delta_v(body_from.mu_km3_s2, from_loc.park_radius_km, v_inf_depart));
        let dv_arrive =
            kms_to_ms(capture_delta_v(body_to.mu_km3_s2, to_loc.park_radius_km, v_inf_arrive));
        let dv_total = dv_depart + dv_arrive + extra_dv_m_s;
        let score = quality_score(dv_total, tof_s, branch.revolutions);

        let better = best
            .as_ref()
            .map(|b| score < b.quality_score)
            .unwrap_or(true);
        if better {
            best = Some(LegSolution {
                dv_total_m_s: dv_total,
                dv_depart_m_s: dv_depart,
                dv_arrive_m_s: dv_arrive,
                tof_s,
                departure_epoch_s,
                arrival_epoch_s: departure_epoch_s + tof_s,
                revolutions: branch.revolutions,
                path_kind: branch.kind,
                quality_score: score,
                helio_r1_km: Some(depart_state.position_km),
                helio_v1_km_s: Some(branch.v1_km_s),
                helio_mu_km3_s2: Some(mu_sun),
                v_inf_depart_km_s: Some(v_inf_depart),
                v_inf_arrive_km_s: Some(v_inf_arrive),
                trajectory_km: None,
            });
        }
    }
    Ok(best)
}
