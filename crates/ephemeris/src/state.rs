//! On-demand state computation: Keplerian propagation with parent-chain
//! accumulation and the restricted-three-body Lagrange approximation.

use std::f64::consts::TAU;

use transit_core::vector::{self, Vector3};
use transit_impulsive::kepler::solve_kepler;
use transit_impulsive::NumericalNonConvergence;

use crate::registry::{Location, Orbit, Registry};
use crate::{EphemerisError, LagrangeKind};

/// Heliocentric position and velocity at an epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
}

impl Registry {
    /// Heliocentric state of a body, accumulated along its parent chain.
    pub fn body_state(&self, id: &str, epoch_s: f64) -> Result<BodyState, EphemerisError> {
        let body = self.body(id)?;
        match &body.orbit {
            Orbit::Fixed { position_km } => Ok(BodyState {
                position_km: *position_km,
                velocity_km_s: [0.0; 3],
            }),
            Orbit::Keplerian {
                semi_major_axis_km,
                eccentricity,
                inclination_rad,
                raan_rad,
                arg_periapsis_rad,
                mean_anomaly_epoch_rad,
                epoch_s: elements_epoch_s,
                period_s,
                parent,
            } => {
                let parent_state = self.body_state(parent, epoch_s)?;
                let (r_rel, v_rel) = keplerian_relative_state(
                    *semi_major_axis_km,
                    *eccentricity,
                    *inclination_rad,
                    *raan_rad,
                    *arg_periapsis_rad,
                    *mean_anomaly_epoch_rad,
                    *elements_epoch_s,
                    *period_s,
                    epoch_s,
                )?;
                Ok(BodyState {
                    position_km: vector::add(&parent_state.position_km, &r_rel),
                    velocity_km_s: vector::add(&parent_state.velocity_km_s, &v_rel),
                })
            }
            Orbit::PolarFromBody {
                parent,
                radius_km,
                angle_rad,
            } => {
                let parent_state = self.body_state(parent, epoch_s)?;
                let offset = [
                    radius_km * angle_rad.cos(),
                    radius_km * angle_rad.sin(),
                    0.0,
                ];
                Ok(BodyState {
                    position_km: vector::add(&parent_state.position_km, &offset),
                    velocity_km_s: parent_state.velocity_km_s,
                })
            }
        }
    }

    /// Heliocentric state of a location.
    ///
    /// Orbit nodes, markers, and surface sites move with their owning body;
    /// Lagrange points are placed in the circular-restricted three-body
    /// approximation from both primaries' instantaneous states.
    pub fn location_state(&self, id: &str, epoch_s: f64) -> Result<BodyState, EphemerisError> {
        let resolved = self.location(id)?;
        match &resolved.location {
            Location::OrbitNode { body, .. }
            | Location::Marker { body }
            | Location::SurfaceSite { body, .. } => self.body_state(body, epoch_s),
            Location::LagrangePoint {
                primary,
                secondary,
                point,
            } => self.lagrange_state(primary, secondary, *point, epoch_s),
        }
    }

    fn lagrange_state(
        &self,
        primary: &str,
        secondary: &str,
        point: LagrangeKind,
        epoch_s: f64,
    ) -> Result<BodyState, EphemerisError> {
        let sp = self.body_state(primary, epoch_s)?;
        let ss = self.body_state(secondary, epoch_s)?;
        let r_rel = vector::sub(&ss.position_km, &sp.position_km);
        let v_rel = vector::sub(&ss.velocity_km_s, &sp.velocity_km_s);
        let d = vector::norm(&r_rel);
        if d <= 0.0 {
            return Err(NumericalNonConvergence {
                context: "lagrange geometry",
                iterations: 0,
            }
            .into());
        }
        let m1 = self.body(primary)?.mass_kg;
        let m2 = self.body(secondary)?.mass_kg;
        let axis = vector::hat(&vector::cross(&r_rel, &v_rel), 1e-12)
            .unwrap_or([0.0, 0.0, 1.0]);

        let offset = match point {
            LagrangeKind::L1 => {
                let hill = (m2 / (3.0 * m1)).cbrt();
                vector::scale(&r_rel, 1.0 - hill)
            }
            LagrangeKind::L2 => {
                let hill = (m2 / (3.0 * m1)).cbrt();
                vector::scale(&r_rel, 1.0 + hill)
            }
            LagrangeKind::L3 => vector::scale(&r_rel, -(1.0 + 5.0 * m2 / (12.0 * m1))),
            LagrangeKind::L4 => rotate_about(&r_rel, &axis, TAU / 6.0),
            LagrangeKind::L5 => rotate_about(&r_rel, &axis, -TAU / 6.0),
        };

        // the point co-rotates with the secondary's instantaneous angular rate
        let omega = vector::scale(&vector::cross(&r_rel, &v_rel), 1.0 / (d * d));
        Ok(BodyState {
            position_km: vector::add(&sp.position_km, &offset),
            velocity_km_s: vector::add(&sp.velocity_km_s, &vector::cross(&omega, &offset)),
        })
    }
}

/// Position and velocity relative to the parent from classical elements.
#[allow(clippy::too_many_arguments)]
fn keplerian_relative_state(
    a_km: f64,
    e: f64,
    inc: f64,
    raan: f64,
    argp: f64,
    m0: f64,
    elements_epoch_s: f64,
    period_s: f64,
    epoch_s: f64,
) -> Result<(Vector3, Vector3), NumericalNonConvergence> {
    let n = TAU / period_s;
    let m = m0 + n * (epoch_s - elements_epoch_s);
    let ea = solve_kepler(m, e)?;
    let (sin_ea, cos_ea) = ea.sin_cos();
    let root = (1.0 - e * e).sqrt();

    let x_orb = a_km * (cos_ea - e);
    let y_orb = a_km * root * sin_ea;
    let ea_dot = n / (1.0 - e * cos_ea);
    let vx_orb = -a_km * sin_ea * ea_dot;
    let vy_orb = a_km * root * cos_ea * ea_dot;

    let r = rotate_313(raan, inc, argp, &[x_orb, y_orb, 0.0]);
    let v = rotate_313(raan, inc, argp, &[vx_orb, vy_orb, 0.0]);
    Ok((r, v))
}

/// Perifocal-to-inertial rotation Rz(raan) Rx(inc) Rz(argp).
fn rotate_313(raan: f64, inc: f64, argp: f64, v: &Vector3) -> Vector3 {
    let (so, co) = raan.sin_cos();
    let (si, ci) = inc.sin_cos();
    let (sw, cw) = argp.sin_cos();
    [
        (co * cw - so * sw * ci) * v[0] + (-co * sw - so * cw * ci) * v[1] + (so * si) * v[2],
        (so * cw + co * sw * ci) * v[0] + (-so * sw + co * cw * ci) * v[1] + (-co * si) * v[2],
        (sw * si) * v[0] + (cw * si) * v[1] + ci * v[2],
    ]
}

/// Rodrigues rotation of `v` by `angle` about the unit vector `axis`.
fn rotate_about(v: &Vector3, axis: &Vector3, angle: f64) -> Vector3 {
    let (s, c) = angle.sin_cos();
    let cross = vector::cross(axis, v);
    let dot = vector::dot(axis, v);
    [
        v[0] * c + cross[0] * s + axis[0] * dot * (1.0 - c),
        v[1] * c + cross[1] * s + axis[1] * dot * (1.0 - c),
        v[2] * c + cross[2] * s + axis[2] * dot * (1.0 - c),
    ]
}
