//! Porkchop scanner: departure x time-of-flight grid evaluation.
//!
//! Each cell is one interplanetary evaluation at that exact flight time; the
//! grid itself is the sweep. Cells are visited serially in row-major order so
//! a given request always produces bit-identical results; the cancel flag and
//! soft deadline are only observed between cells.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use transit_core::time::days_to_seconds;

use crate::planner::{evaluate_interplanetary_at_tof, hohmann_anchor, TransferPlanner};
use crate::types::LegSolution;
use crate::TransferError;

/// Number of fully expanded best cells returned alongside the grid.
pub const PORKCHOP_TOP_N: usize = 10;
/// Smallest accepted grid edge.
pub const MIN_GRID_SIZE: usize = 4;
/// Largest accepted grid edge.
pub const MAX_GRID_SIZE: usize = 100;

/// Inputs of one porkchop scan. Departures are epochs in seconds, flight
/// times in days; both axes are sampled uniformly with `grid_size` points.
#[derive(Debug, Clone)]
pub struct PorkchopRequest {
    pub from_body: String,
    pub to_body: String,
    pub departure_start_s: f64,
    pub departure_end_s: f64,
    pub tof_min_days: f64,
    pub tof_max_days: f64,
    pub grid_size: usize,
    pub max_revs: u32,
}

/// Cooperative cancellation: an optional flag raised by the host and an
/// optional wall-clock deadline.
#[derive(Debug, Clone, Default)]
pub struct PorkchopControl {
    pub cancel: Option<Arc<AtomicBool>>,
    pub deadline: Option<Instant>,
}

impl PorkchopControl {
    fn interrupted(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Grid of total delta-v plus the best cells, fully expanded.
#[derive(Debug, Clone, Serialize)]
pub struct PorkchopResult {
    /// Departure epochs, one per row.
    pub departures_s: Vec<f64>,
    /// Flight times in days, one per column.
    pub tofs_days: Vec<f64>,
    /// `dv_m_s[row][col]`; NaN marks cells with no converged branch.
    pub dv_m_s: Vec<Vec<f64>>,
    /// Best cells by quality score, ties broken by delta-v, flight time,
    /// then revolutions.
    pub top: Vec<LegSolution>,
}

impl TransferPlanner {
    /// Scan a departure x time-of-flight grid between two bodies.
    ///
    /// Burns are priced from each body's gateway parking node. A raised
    /// cancel flag or an expired deadline yields [`TransferError::Cancelled`]
    /// carrying the partially filled grid.
    pub fn compute_porkchop(
        &self,
        request: &PorkchopRequest,
        control: &PorkchopControl,
    ) -> Result<PorkchopResult, TransferError> {
        validate_request(request)?;
        let registry = self.registry();
        registry.body(&request.from_body)?;
        registry.body(&request.to_body)?;
        let from_gateway = registry.gateway(&request.from_body).ok_or_else(|| {
            TransferError::InvalidRequest {
                reason: format!("body `{}` has no parking orbit node", request.from_body),
            }
        })?;
        let to_gateway = registry.gateway(&request.to_body).ok_or_else(|| {
            TransferError::InvalidRequest {
                reason: format!("body `{}` has no parking orbit node", request.to_body),
            }
        })?;

        let n = request.grid_size;
        let departures_s = linspace(request.departure_start_s, request.departure_end_s, n);
        let tofs_days = linspace(request.tof_min_days, request.tof_max_days, n);
        let mut dv_m_s = vec![vec![f64::NAN; n]; n];
        let mut candidates: Vec<LegSolution> = Vec::new();
        let mut cells_filled = 0usize;

        for (row, departure_s) in departures_s.iter().enumerate() {
            for (col, tof_days) in tofs_days.iter().enumerate() {
                if control.interrupted() {
                    log::debug!(
                        "porkchop {} -> {} interrupted after {cells_filled} cells",
                        request.from_body,
                        request.to_body
                    );
                    return Err(TransferError::Cancelled {
                        partial: PorkchopResult {
                            departures_s: departures_s.clone(),
                            tofs_days: tofs_days.clone(),
                            dv_m_s,
                            top: top_cells(candidates),
                        },
                        cells_filled,
                    });
                }
                let evaluated = evaluate_interplanetary_at_tof(
                    &registry,
                    from_gateway,
                    to_gateway,
                    *departure_s,
                    days_to_seconds(*tof_days),
                    0.0,
                    request.max_revs,
                );
                match evaluated {
                    Ok(Some(leg)) => {
                        dv_m_s[row][col] = leg.dv_total_m_s;
                        candidates.push(leg);
                    }
                    // infeasible or numerically hopeless cells stay NaN
                    Ok(None) | Err(TransferError::NonConvergence(_)) => {}
                    Err(other) => return Err(other),
                }
                cells_filled += 1;
            }
        }

        if candidates.is_empty() {
            let anchor = hohmann_anchor(&registry, from_gateway, to_gateway)?;
            return Err(TransferError::NoFeasibleTransfer {
                hohmann_dv_m_s: anchor.dv_total_m_s,
                hohmann_tof_s: anchor.tof_s,
            });
        }

        Ok(PorkchopResult {
            departures_s,
            tofs_days,
            dv_m_s,
            top: top_cells(candidates),
        })
    }
}

fn validate_request(request: &PorkchopRequest) -> Result<(), TransferError> {
    let fail = |reason: String| Err(TransferError::InvalidRequest { reason });
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&request.grid_size) {
        return fail(format!(
            "grid_size {} outside [{MIN_GRID_SIZE}, {MAX_GRID_SIZE}]",
            request.grid_size
        ));
    }
    if request.from_body == request.to_body {
        return fail("porkchop endpoints must differ".to_string());
    }
    if !(request.tof_min_days > 0.0) || request.tof_max_days < request.tof_min_days {
        return fail(format!(
            "flight-time bounds [{}, {}] are not an ascending positive range",
            request.tof_min_days, request.tof_max_days
        ));
    }
    if request.departure_end_s < request.departure_start_s {
        return fail("departure window end precedes its start".to_string());
    }
    Ok(())
}

fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| start + (end - start) * i as f64 / (count - 1) as f64)
        .collect()
}

fn top_cells(mut candidates: Vec<LegSolution>) -> Vec<LegSolution> {
    candidates.sort_by(|a, b| {
        a.quality_score
            .total_cmp(&b.quality_score)
            .then(a.dv_total_m_s.total_cmp(&b.dv_total_m_s))
            .then(a.tof_s.total_cmp(&b.tof_s))
            .then(a.revolutions.cmp(&b.revolutions))
    });
    candidates.truncate(PORKCHOP_TOP_N);
    candidates
}
