//! Structural validation of a parsed configuration document.
//!
//! Runs before a registry is built so a broken document never replaces a
//! working one. Every failure names the offending field path.

use std::collections::{HashMap, HashSet};

use crate::model::{ConfigDocument, EdgeKindConfig, PositionConfig};
use crate::ConfigError;

pub fn validate(doc: &ConfigDocument) -> Result<(), ConfigError> {
    let mut body_ids = HashSet::new();
    let mut fixed_roots = Vec::new();
    for (i, body) in doc.bodies.iter().enumerate() {
        let path = format!("bodies[{i}]");
        if body.id.trim().is_empty() {
            return Err(invalid(&path, "body id must not be empty"));
        }
        if !body_ids.insert(body.id.as_str()) {
            return Err(invalid(&path, format!("duplicate body id `{}`", body.id)));
        }
        if !(body.mu_km3_s2 > 0.0) {
            return Err(invalid(&format!("{path}.mu_km3_s2"), "mu must be positive"));
        }
        if !(body.radius_km > 0.0) {
            return Err(invalid(
                &format!("{path}.radius_km"),
                "radius must be positive",
            ));
        }
        if let Some(soi) = body.soi_radius_km {
            if !(soi > 0.0) {
                return Err(invalid(
                    &format!("{path}.soi_radius_km"),
                    "SOI radius must be positive when present",
                ));
            }
        }
        match &body.position {
            PositionConfig::Fixed { .. } => fixed_roots.push(body.id.as_str()),
            PositionConfig::Keplerian {
                eccentricity,
                semi_major_axis_km,
                period_s,
                ..
            } => {
                if !(0.0..1.0).contains(eccentricity) {
                    return Err(invalid(
                        &format!("{path}.position.eccentricity"),
                        "eccentricity must lie in [0, 1)",
                    ));
                }
                if !(*semi_major_axis_km > 0.0) || !(*period_s > 0.0) {
                    return Err(invalid(
                        &format!("{path}.position"),
                        "semi-major axis and period must be positive",
                    ));
                }
            }
            PositionConfig::PolarFromBody { radius_km, .. } => {
                if !(*radius_km > 0.0) {
                    return Err(invalid(
                        &format!("{path}.position.radius_km"),
                        "polar radius must be positive",
                    ));
                }
            }
        }
    }

    if fixed_roots.len() != 1 {
        return Err(invalid(
            "bodies",
            format!(
                "expected exactly one fixed root body, found {}",
                fixed_roots.len()
            ),
        ));
    }

    // Parent chains must resolve and terminate at the fixed root.
    let parents: HashMap<&str, Option<&str>> = doc
        .bodies
        .iter()
        .map(|b| (b.id.as_str(), b.position.parent()))
        .collect();
    for (i, body) in doc.bodies.iter().enumerate() {
        let mut seen = HashSet::new();
        let mut cursor = body.id.as_str();
        loop {
            if !seen.insert(cursor) {
                return Err(invalid(
                    &format!("bodies[{i}].position.parent"),
                    format!("parent chain of `{}` contains a cycle", body.id),
                ));
            }
            match parents.get(cursor) {
                Some(Some(next)) => cursor = next,
                Some(None) => break,
                None => {
                    return Err(invalid(
                        &format!("bodies[{i}].position.parent"),
                        format!("unknown parent body `{cursor}`"),
                    ));
                }
            }
        }
    }

    // Locations: unique ids, resolvable bodies.
    let mut location_bodies: HashMap<&str, &str> = HashMap::new();
    for (i, node) in doc.locations.orbit_nodes.iter().enumerate() {
        let path = format!("locations.orbit_nodes[{i}]");
        check_location(&location_bodies, &body_ids, &path, &node.id, &node.body)?;
        if node.altitude_km < 0.0 {
            return Err(invalid(
                &format!("{path}.altitude_km"),
                "altitude must be non-negative",
            ));
        }
        location_bodies.insert(&node.id, &node.body);
    }
    for (i, marker) in doc.locations.markers.iter().enumerate() {
        let path = format!("locations.markers[{i}]");
        check_location(&location_bodies, &body_ids, &path, &marker.id, &marker.body)?;
        location_bodies.insert(&marker.id, &marker.body);
    }
    for (i, site) in doc.locations.surface_sites.iter().enumerate() {
        let path = format!("locations.surface_sites[{i}]");
        check_location(&location_bodies, &body_ids, &path, &site.id, &site.body)?;
        location_bodies.insert(&site.id, &site.body);
    }
    for (i, point) in doc.locations.lagrange_points.iter().enumerate() {
        let path = format!("locations.lagrange_points[{i}]");
        check_location(&location_bodies, &body_ids, &path, &point.id, &point.primary)?;
        if !body_ids.contains(point.secondary.as_str()) {
            return Err(invalid(
                &path,
                format!("unknown secondary body `{}`", point.secondary),
            ));
        }
        // the point resolves to its primary for graph purposes
        location_bodies.insert(&point.id, &point.primary);
    }

    // Edges: endpoints resolve; kind invariants hold.
    let soi_bodies: HashSet<&str> = doc
        .bodies
        .iter()
        .filter(|b| b.soi_radius_km.is_some_and(|soi| soi > 0.0))
        .map(|b| b.id.as_str())
        .collect();
    for (i, edge) in doc.transfer_edges.iter().enumerate() {
        let path = format!("transfer_edges[{i}]");
        let body_a = location_bodies
            .get(edge.a.as_str())
            .ok_or_else(|| invalid(&path, format!("unknown location `{}`", edge.a)))?;
        let body_b = location_bodies
            .get(edge.b.as_str())
            .ok_or_else(|| invalid(&path, format!("unknown location `{}`", edge.b)))?;
        match edge.kind {
            EdgeKindConfig::Local => {
                if body_a != body_b {
                    return Err(invalid(
                        &path,
                        "local edges must connect locations with the same parent body",
                    ));
                }
            }
            EdgeKindConfig::Interplanetary => {
                if body_a == body_b {
                    return Err(invalid(
                        &path,
                        "interplanetary edges must connect different parent bodies",
                    ));
                }
                if !soi_bodies.contains(body_a) || !soi_bodies.contains(body_b) {
                    return Err(invalid(
                        &path,
                        "interplanetary endpoints require a non-zero SOI radius",
                    ));
                }
            }
            EdgeKindConfig::Lagrange => {
                if edge.dv_m_s.is_none() || edge.tof_s.is_none() {
                    return Err(invalid(
                        &path,
                        "lagrange edges must carry static dv_m_s and tof_s",
                    ));
                }
            }
            EdgeKindConfig::Landing => {}
        }
    }

    Ok(())
}

fn check_location(
    location_bodies: &HashMap<&str, &str>,
    body_ids: &HashSet<&str>,
    path: &str,
    id: &str,
    body: &str,
) -> Result<(), ConfigError> {
    if location_bodies.contains_key(id) {
        return Err(invalid(path, format!("duplicate location id `{id}`")));
    }
    if !body_ids.contains(body) {
        return Err(invalid(path, format!("unknown body `{body}`")));
    }
    Ok(())
}

fn invalid(path: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        path: path.to_string(),
        reason: reason.into(),
    }
}
