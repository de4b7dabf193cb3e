//! Export helpers for JSON and CSV artifacts.

pub mod trajectory {
    //! The persistence contract for in-flight trajectories: the host stores
    //! this payload verbatim and hands it back to recompute or verify state.

    use serde::{Deserialize, Serialize};
    use thiserror::Error;
    use transit_core::vector::{self, Vector3};
    use transit_impulsive::kepler::propagate_universal;
    use transit_impulsive::NumericalNonConvergence;
    use transit_transfer::trajectory::compute_trajectory_points;
    use transit_transfer::LegSolution;

    /// Accepted drift between a stored endpoint and its recomputed position.
    pub const ENDPOINT_TOLERANCE_KM: f64 = 1.0;

    /// Round-trippable description of one heliocentric transfer arc.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TrajectoryPayload {
        pub points: Vec<Vector3>,
        pub mu: f64,
        pub r1: Vector3,
        pub v1: Vector3,
        pub tof_s: f64,
    }

    #[derive(Debug, Error)]
    pub enum TrajectoryError {
        #[error("leg solution carries no heliocentric arc data")]
        MissingArc,
        #[error("payload has no sampled points")]
        Empty,
        #[error("stored endpoint deviates from the arc by {deviation_km:.3} km")]
        EndpointMismatch { deviation_km: f64 },
        #[error(transparent)]
        NonConvergence(#[from] NumericalNonConvergence),
        #[error("serialization error: {0}")]
        Json(#[from] serde_json::Error),
    }

    /// Build a payload from an interplanetary leg, sampling `samples` points.
    pub fn payload_from_leg(
        leg: &LegSolution,
        samples: usize,
    ) -> Result<TrajectoryPayload, TrajectoryError> {
        let (Some(r1), Some(v1), Some(mu)) =
            (leg.helio_r1_km, leg.helio_v1_km_s, leg.helio_mu_km3_s2)
        else {
            return Err(TrajectoryError::MissingArc);
        };
        let points = match &leg.trajectory_km {
            Some(points) => points.clone(),
            None => compute_trajectory_points(&r1, &v1, mu, leg.tof_s, samples)?,
        };
        Ok(TrajectoryPayload {
            points,
            mu,
            r1,
            v1,
            tof_s: leg.tof_s,
        })
    }

    pub fn to_json(payload: &TrajectoryPayload) -> Result<String, TrajectoryError> {
        Ok(serde_json::to_string(payload)?)
    }

    pub fn from_json(json: &str) -> Result<TrajectoryPayload, TrajectoryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Re-sample the stored arc, e.g. at a different resolution.
    pub fn recompute_points(
        payload: &TrajectoryPayload,
        samples: usize,
    ) -> Result<Vec<Vector3>, TrajectoryError> {
        Ok(compute_trajectory_points(
            &payload.r1,
            &payload.v1,
            payload.mu,
            payload.tof_s,
            samples,
        )?)
    }

    /// Check a stored payload against its own arc: the first point must be
    /// the departure position and the last must match the propagated arrival.
    pub fn verify(payload: &TrajectoryPayload) -> Result<(), TrajectoryError> {
        let (Some(first), Some(last)) = (payload.points.first(), payload.points.last()) else {
            return Err(TrajectoryError::Empty);
        };
        let start_drift = vector::norm(&vector::sub(first, &payload.r1));
        if start_drift > ENDPOINT_TOLERANCE_KM {
            return Err(TrajectoryError::EndpointMismatch {
                deviation_km: start_drift,
            });
        }
        let (arrival, _) =
            propagate_universal(&payload.r1, &payload.v1, payload.mu, payload.tof_s)?;
        let end_drift = vector::norm(&vector::sub(last, &arrival));
        if end_drift > ENDPOINT_TOLERANCE_KM {
            return Err(TrajectoryError::EndpointMismatch {
                deviation_km: end_drift,
            });
        }
        Ok(())
    }

}

pub mod porkchop {
    //! CSV artifacts for porkchop grids: one row per cell plus a separate
    //! fully expanded table for the best cells.

    use std::fs::{self, File};
    use std::io::{self, BufWriter, Write};
    use std::path::Path;

    use transit_transfer::{LegSolution, PorkchopResult};

    const GRID_HEADER: &str = "departure_s,tof_days,dv_total_m_s,feasible";
    const TOP_HEADER: &str = "rank,departure_s,tof_days,dv_total_m_s,dv_depart_m_s,dv_arrive_m_s,revolutions,path_kind,quality_score";

    /// Create a writer for the target path, handling stdout (`-`) by convention.
    pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
        if path == Path::new("-") {
            return Ok(Box::new(BufWriter::new(io::stdout())));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    /// Write every grid cell; infeasible cells keep an empty delta-v column.
    pub fn write_grid(writer: &mut dyn Write, result: &PorkchopResult) -> io::Result<()> {
        writeln!(writer, "{GRID_HEADER}")?;
        for (row, departure_s) in result.departures_s.iter().enumerate() {
            for (col, tof_days) in result.tofs_days.iter().enumerate() {
                let dv = result.dv_m_s[row][col];
                if dv.is_finite() {
                    writeln!(writer, "{departure_s},{tof_days:.6},{dv:.3},true")?;
                } else {
                    writeln!(writer, "{departure_s},{tof_days:.6},,false")?;
                }
            }
        }
        Ok(())
    }

    /// Write the ranked best cells with their full burn decomposition.
    pub fn write_top(writer: &mut dyn Write, top: &[LegSolution]) -> io::Result<()> {
        writeln!(writer, "{TOP_HEADER}")?;
        for (rank, leg) in top.iter().enumerate() {
            writeln!(
                writer,
                "{},{},{:.6},{:.3},{:.3},{:.3},{},{:?},{:.3}",
                rank + 1,
                leg.departure_epoch_s,
                leg.tof_s / 86_400.0,
                leg.dv_total_m_s,
                leg.dv_depart_m_s,
                leg.dv_arrive_m_s,
                leg.revolutions,
                leg.path_kind,
                leg.quality_score,
            )?;
        }
        Ok(())
    }
}
