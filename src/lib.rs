//! Interplanetary transfer planning core for a space-logistics simulator.
//!
//! This facade re-exports the workspace crates under stable module names so
//! hosts (and the bundled CLI) depend on a single package. The layering runs
//! bottom-up: physics primitives and the Lambert solver (`impulsive`),
//! patched-conic burn helpers (`orbits`), the configuration loader
//! (`config`), the Keplerian registry ephemeris (`ephemeris`), leg planning
//! with the porkchop scanner (`transfer`), the route graph (`routes`), and
//! artifact exporters (`export`).

pub mod core {
    pub use transit_core::*;
}

pub mod impulsive {
    pub use transit_impulsive::*;
}

pub mod orbits {
    pub use transit_orbits::*;
}

pub mod config {
    pub use transit_config::*;
}

pub mod ephemeris {
    pub use transit_ephemeris::*;
}

pub mod transfer {
    pub use transit_transfer::*;
}

pub mod routes {
    pub use transit_routes::*;
}

pub mod export {
    pub use transit_export::*;
}

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
