//! Transfer planning over an immutable registry.
//!
//! The [`planner::TransferPlanner`] prices individual legs (closed-form for
//! same-body geometry, Lambert-based for interplanetary ones) behind a
//! bucketed LRU cache, samples heliocentric trajectories, and drives the
//! porkchop scanner.

use thiserror::Error;
use transit_ephemeris::EphemerisError;
use transit_impulsive::NumericalNonConvergence;

pub mod cache;
pub mod planner;
pub mod porkchop;
pub mod trajectory;
mod types;

pub use cache::CacheStats;
pub use planner::TransferPlanner;
pub use porkchop::{PorkchopControl, PorkchopRequest, PorkchopResult};
pub use types::{quality_score, LegSolution, REV_PENALTY_M_S, TOF_WEIGHT_M_S_PER_DAY};

/// Errors surfaced by leg and porkchop queries.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    #[error(transparent)]
    NonConvergence(#[from] NumericalNonConvergence),
    /// Normal outcome for hopeless geometry; carries the coplanar-circular
    /// estimate so callers can fall back to it.
    #[error("no feasible transfer (hohmann floor {hohmann_dv_m_s:.0} m/s, {hohmann_tof_s:.0} s)")]
    NoFeasibleTransfer {
        hohmann_dv_m_s: f64,
        hohmann_tof_s: f64,
    },
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
    /// A porkchop scan observed its cancel flag or deadline; the grid filled
    /// so far rides along.
    #[error("porkchop scan cancelled after {cells_filled} cells")]
    Cancelled {
        partial: PorkchopResult,
        cells_filled: usize,
    },
}
