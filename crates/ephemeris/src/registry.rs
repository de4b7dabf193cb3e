//! Immutable registry of bodies, locations, and configured transfer edges.

use std::collections::HashMap;

use transit_config::{
    ConfigDocument, ConfigError, EdgeKindConfig, LagrangeKind, PositionConfig,
};
use transit_core::time::jd_to_epoch_seconds;
use transit_core::vector::Vector3;

use crate::EphemerisError;

/// One gravitating or kinematic object, resolved from configuration.
#[derive(Debug, Clone)]
pub struct Body {
    pub id: String,
    pub name: String,
    pub mass_kg: f64,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
    pub gravity_m_s2: f64,
    pub soi_radius_km: Option<f64>,
    pub gateway_location_id: Option<String>,
    pub orbit: Orbit,
}

impl Body {
    /// Whether the body can anchor an interplanetary transfer endpoint.
    pub fn has_soi(&self) -> bool {
        self.soi_radius_km.is_some_and(|soi| soi > 0.0)
    }
}

/// How a body moves. Angles are radians, epochs seconds past J2000.
#[derive(Debug, Clone)]
pub enum Orbit {
    Fixed {
        position_km: Vector3,
    },
    Keplerian {
        semi_major_axis_km: f64,
        eccentricity: f64,
        inclination_rad: f64,
        raan_rad: f64,
        arg_periapsis_rad: f64,
        mean_anomaly_epoch_rad: f64,
        epoch_s: f64,
        period_s: f64,
        parent: String,
    },
    PolarFromBody {
        parent: String,
        radius_km: f64,
        angle_rad: f64,
    },
}

impl Orbit {
    pub fn parent(&self) -> Option<&str> {
        match self {
            Orbit::Fixed { .. } => None,
            Orbit::Keplerian { parent, .. } => Some(parent),
            Orbit::PolarFromBody { parent, .. } => Some(parent),
        }
    }
}

/// A named point of the transfer graph.
#[derive(Debug, Clone)]
pub enum Location {
    OrbitNode {
        body: String,
        radius_km_from_center: f64,
    },
    Marker {
        body: String,
    },
    SurfaceSite {
        body: String,
        landing_dv_m_s: f64,
        landing_tof_s: f64,
        surface_gravity_m_s2: f64,
    },
    LagrangePoint {
        primary: String,
        secondary: String,
        point: LagrangeKind,
    },
}

/// A location with its owning body and parking radius resolved at build time.
#[derive(Debug, Clone)]
pub struct ResolvedLocation {
    pub id: String,
    /// Owning body; the primary for Lagrange points.
    pub body_id: String,
    /// Circular parking radius used for patched-conic burns.
    pub park_radius_km: f64,
    pub location: Location,
}

/// Kind tag of a transfer edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Local,
    Landing,
    Lagrange,
    Interplanetary,
}

impl From<EdgeKindConfig> for EdgeKind {
    fn from(kind: EdgeKindConfig) -> Self {
        match kind {
            EdgeKindConfig::Local => EdgeKind::Local,
            EdgeKindConfig::Landing => EdgeKind::Landing,
            EdgeKindConfig::Lagrange => EdgeKind::Lagrange,
            EdgeKindConfig::Interplanetary => EdgeKind::Interplanetary,
        }
    }
}

/// Undirected edge between two locations, with optional static/fallback cost.
#[derive(Debug, Clone)]
pub struct TransferEdge {
    pub a: String,
    pub b: String,
    pub kind: EdgeKind,
    pub fallback_dv_m_s: Option<f64>,
    pub fallback_tof_s: Option<f64>,
}

/// Immutable snapshot of the configured system.
#[derive(Debug)]
pub struct Registry {
    bodies: HashMap<String, Body>,
    locations: HashMap<String, ResolvedLocation>,
    edges: Vec<TransferEdge>,
    central_body_id: String,
    auto_interplanetary_edges: bool,
}

impl Registry {
    /// Build a registry from a configuration document.
    ///
    /// The document is (re)validated first; the registry adds referential
    /// checks that need the resolved shape, such as gateway overrides.
    pub fn from_config(doc: &ConfigDocument) -> Result<Self, ConfigError> {
        transit_config::validate(doc)?;

        let mut bodies = HashMap::new();
        let mut central_body_id = String::new();
        for cfg in &doc.bodies {
            let orbit = match &cfg.position {
                PositionConfig::Fixed { x_km, y_km, z_km } => {
                    central_body_id = cfg.id.clone();
                    Orbit::Fixed {
                        position_km: [*x_km, *y_km, *z_km],
                    }
                }
                PositionConfig::Keplerian {
                    semi_major_axis_km,
                    eccentricity,
                    inclination_deg,
                    raan_deg,
                    arg_periapsis_deg,
                    mean_anomaly_deg,
                    epoch_jd,
                    period_s,
                    parent,
                } => Orbit::Keplerian {
                    semi_major_axis_km: *semi_major_axis_km,
                    eccentricity: *eccentricity,
                    inclination_rad: inclination_deg.to_radians(),
                    raan_rad: raan_deg.to_radians(),
                    arg_periapsis_rad: arg_periapsis_deg.to_radians(),
                    mean_anomaly_epoch_rad: mean_anomaly_deg.to_radians(),
                    epoch_s: jd_to_epoch_seconds(*epoch_jd),
                    period_s: *period_s,
                    parent: parent.clone(),
                },
                PositionConfig::PolarFromBody {
                    parent,
                    radius_km,
                    angle_deg,
                } => Orbit::PolarFromBody {
                    parent: parent.clone(),
                    radius_km: *radius_km,
                    angle_rad: angle_deg.to_radians(),
                },
            };
            bodies.insert(
                cfg.id.clone(),
                Body {
                    id: cfg.id.clone(),
                    name: cfg.name.clone().unwrap_or_else(|| cfg.id.clone()),
                    mass_kg: cfg.mass_kg,
                    mu_km3_s2: cfg.mu_km3_s2,
                    radius_km: cfg.radius_km,
                    gravity_m_s2: cfg.gravity_m_s2,
                    soi_radius_km: cfg.soi_radius_km,
                    gateway_location_id: cfg.gateway_location_id.clone(),
                    orbit,
                },
            );
        }

        let mut locations = HashMap::new();
        for node in &doc.locations.orbit_nodes {
            let body = &bodies[&node.body];
            locations.insert(
                node.id.clone(),
                ResolvedLocation {
                    id: node.id.clone(),
                    body_id: node.body.clone(),
                    park_radius_km: body.radius_km + node.altitude_km,
                    location: Location::OrbitNode {
                        body: node.body.clone(),
                        radius_km_from_center: body.radius_km + node.altitude_km,
                    },
                },
            );
        }
        for marker in &doc.locations.markers {
            let body = &bodies[&marker.body];
            locations.insert(
                marker.id.clone(),
                ResolvedLocation {
                    id: marker.id.clone(),
                    body_id: marker.body.clone(),
                    park_radius_km: body.radius_km,
                    location: Location::Marker {
                        body: marker.body.clone(),
                    },
                },
            );
        }
        for site in &doc.locations.surface_sites {
            let body = &bodies[&site.body];
            locations.insert(
                site.id.clone(),
                ResolvedLocation {
                    id: site.id.clone(),
                    body_id: site.body.clone(),
                    park_radius_km: body.radius_km,
                    location: Location::SurfaceSite {
                        body: site.body.clone(),
                        landing_dv_m_s: site.landing_dv_m_s,
                        landing_tof_s: site.landing_tof_s,
                        surface_gravity_m_s2: site.surface_gravity_m_s2,
                    },
                },
            );
        }
        for point in &doc.locations.lagrange_points {
            let body = &bodies[&point.primary];
            locations.insert(
                point.id.clone(),
                ResolvedLocation {
                    id: point.id.clone(),
                    body_id: point.primary.clone(),
                    park_radius_km: body.radius_km,
                    location: Location::LagrangePoint {
                        primary: point.primary.clone(),
                        secondary: point.secondary.clone(),
                        point: point.point,
                    },
                },
            );
        }

        // gateway overrides must name an orbit node of the owning body
        for body in bodies.values() {
            if let Some(gateway) = &body.gateway_location_id {
                let ok = locations.get(gateway).is_some_and(|loc| {
                    loc.body_id == body.id
                        && matches!(loc.location, Location::OrbitNode { .. })
                });
                if !ok {
                    return Err(ConfigError::Validation {
                        path: format!("bodies.{}.gateway_location_id", body.id),
                        reason: format!(
                            "gateway `{gateway}` is not an orbit node of `{}`",
                            body.id
                        ),
                    });
                }
            }
        }

        let edges = doc
            .transfer_edges
            .iter()
            .map(|edge| TransferEdge {
                a: edge.a.clone(),
                b: edge.b.clone(),
                kind: edge.kind.into(),
                fallback_dv_m_s: edge.dv_m_s,
                fallback_tof_s: edge.tof_s,
            })
            .collect();

        log::debug!(
            "registry built: {} bodies, {} locations, central body `{central_body_id}`",
            bodies.len(),
            locations.len()
        );
        Ok(Self {
            bodies,
            locations,
            edges,
            central_body_id,
            auto_interplanetary_edges: doc.auto_interplanetary_edges,
        })
    }

    pub fn body(&self, id: &str) -> Result<&Body, EphemerisError> {
        self.bodies
            .get(id)
            .ok_or_else(|| EphemerisError::UnknownBody(id.to_string()))
    }

    pub fn location(&self, id: &str) -> Result<&ResolvedLocation, EphemerisError> {
        self.locations
            .get(id)
            .ok_or_else(|| EphemerisError::UnknownLocation(id.to_string()))
    }

    /// The fixed root body all parent chains terminate at.
    pub fn central_body(&self) -> &Body {
        &self.bodies[&self.central_body_id]
    }

    /// Gravitational parameter of the central body, the only heliocentric mu
    /// the planner uses.
    pub fn central_mu(&self) -> f64 {
        self.central_body().mu_km3_s2
    }

    pub fn auto_interplanetary_edges(&self) -> bool {
        self.auto_interplanetary_edges
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn locations(&self) -> impl Iterator<Item = &ResolvedLocation> {
        self.locations.values()
    }

    pub fn edges(&self) -> &[TransferEdge] {
        &self.edges
    }

    /// Parking node for interplanetary departures from `body_id`: the
    /// configured gateway override, otherwise the lowest orbit node.
    pub fn gateway(&self, body_id: &str) -> Option<&ResolvedLocation> {
        if let Some(body) = self.bodies.get(body_id) {
            if let Some(id) = &body.gateway_location_id {
                return self.locations.get(id);
            }
        }
        self.locations
            .values()
            .filter(|loc| {
                loc.body_id == body_id && matches!(loc.location, Location::OrbitNode { .. })
            })
            .min_by(|a, b| {
                a.park_radius_km
                    .total_cmp(&b.park_radius_km)
                    .then_with(|| a.id.cmp(&b.id))
            })
    }

    /// Semi-major axis of the body's top-level ancestor about the central
    /// body, used as the scale anchor for transfer-time estimates.
    pub fn heliocentric_sma_km(&self, body_id: &str) -> Result<f64, EphemerisError> {
        let mut body = self.body(body_id)?;
        loop {
            match &body.orbit {
                Orbit::Fixed { position_km } => {
                    return Ok(transit_core::vector::norm(position_km));
                }
                Orbit::Keplerian {
                    semi_major_axis_km,
                    parent,
                    ..
                } => {
                    if parent == &self.central_body_id {
                        return Ok(*semi_major_axis_km);
                    }
                    body = self.body(parent)?;
                }
                Orbit::PolarFromBody {
                    parent, radius_km, ..
                } => {
                    if parent == &self.central_body_id {
                        return Ok(*radius_km);
                    }
                    body = self.body(parent)?;
                }
            }
        }
    }
}
