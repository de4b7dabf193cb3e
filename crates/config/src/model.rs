//! Serde models for the declarative body/location/edge document.

use serde::{Deserialize, Serialize};

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfigDocument {
    /// When set, gateway orbit nodes of all SOI-bearing bodies are joined by
    /// generated interplanetary edges in addition to the configured ones.
    #[serde(default)]
    pub auto_interplanetary_edges: bool,
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub locations: LocationsConfig,
    #[serde(default)]
    pub transfer_edges: Vec<EdgeConfig>,
}

/// One gravitating or kinematic object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BodyConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub mass_kg: f64,
    pub mu_km3_s2: f64,
    pub radius_km: f64,
    pub gravity_m_s2: f64,
    /// Absent for bodies that are never transfer endpoints.
    #[serde(default)]
    pub soi_radius_km: Option<f64>,
    /// Preferred parking node; falls back to the lowest orbit node.
    #[serde(default)]
    pub gateway_location_id: Option<String>,
    pub position: PositionConfig,
}

/// How a body moves. Angles are degrees in the document, radians internally.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum PositionConfig {
    #[serde(rename = "fixed")]
    Fixed {
        x_km: f64,
        y_km: f64,
        z_km: f64,
    },
    #[serde(rename = "keplerian")]
    Keplerian {
        semi_major_axis_km: f64,
        eccentricity: f64,
        #[serde(default)]
        inclination_deg: f64,
        #[serde(default)]
        raan_deg: f64,
        #[serde(default)]
        arg_periapsis_deg: f64,
        #[serde(default)]
        mean_anomaly_deg: f64,
        epoch_jd: f64,
        period_s: f64,
        parent: String,
    },
    #[serde(rename = "polar_from_body")]
    PolarFromBody {
        parent: String,
        radius_km: f64,
        angle_deg: f64,
    },
}

impl PositionConfig {
    /// Parent body id, if the position is defined relative to one.
    pub fn parent(&self) -> Option<&str> {
        match self {
            PositionConfig::Fixed { .. } => None,
            PositionConfig::Keplerian { parent, .. } => Some(parent),
            PositionConfig::PolarFromBody { parent, .. } => Some(parent),
        }
    }
}

/// Named points of the transfer graph, grouped by category.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LocationsConfig {
    #[serde(default)]
    pub orbit_nodes: Vec<OrbitNodeConfig>,
    #[serde(default)]
    pub markers: Vec<MarkerConfig>,
    #[serde(default)]
    pub surface_sites: Vec<SurfaceSiteConfig>,
    #[serde(default)]
    pub lagrange_points: Vec<LagrangePointConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrbitNodeConfig {
    pub id: String,
    pub body: String,
    /// Altitude above the body's mean radius; the registry derives the
    /// radius from the body centre.
    pub altitude_km: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarkerConfig {
    pub id: String,
    pub body: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SurfaceSiteConfig {
    pub id: String,
    pub body: String,
    pub landing_dv_m_s: f64,
    pub landing_tof_s: f64,
    pub surface_gravity_m_s2: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LagrangePointConfig {
    pub id: String,
    pub primary: String,
    pub secondary: String,
    pub point: LagrangeKind,
}

/// The five equilibrium points of the restricted three-body problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LagrangeKind {
    L1,
    L2,
    L3,
    L4,
    L5,
}

/// Undirected edge between two locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EdgeConfig {
    pub a: String,
    pub b: String,
    #[serde(rename = "type")]
    pub kind: EdgeKindConfig,
    /// Static or fallback cost, depending on the edge kind.
    #[serde(default)]
    pub dv_m_s: Option<f64>,
    #[serde(default)]
    pub tof_s: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKindConfig {
    Local,
    Landing,
    Lagrange,
    Interplanetary,
}
