//! Body/location registry and heliocentric ephemeris.
//!
//! The registry is built once from a validated configuration document and is
//! immutable afterwards; reloading swaps in a freshly built registry. States
//! are always heliocentric, accumulated along the parent chain, and computed
//! on demand; nothing here is cached or persisted.

use thiserror::Error;
use transit_impulsive::NumericalNonConvergence;

mod registry;
mod state;

pub use registry::{
    Body, EdgeKind, Location, Orbit, Registry, ResolvedLocation, TransferEdge,
};
pub use state::BodyState;
pub use transit_config::LagrangeKind;

/// Errors surfaced while resolving bodies, locations, or their states.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("unknown body `{0}`")]
    UnknownBody(String),
    #[error("unknown location `{0}`")]
    UnknownLocation(String),
    #[error(transparent)]
    NonConvergence(#[from] NumericalNonConvergence),
}
