//! Configuration models and loaders for the orbital transit planner.
//!
//! Documents are YAML by default with TOML accepted by extension, mirroring
//! how scenario manifests are shipped. A document that fails to parse or
//! validate is rejected wholesale so a previously loaded registry stays in
//! force.

use std::path::Path;

use thiserror::Error;

mod model;
mod validate;

pub use model::{
    BodyConfig, ConfigDocument, EdgeConfig, EdgeKindConfig, LagrangeKind, LagrangePointConfig,
    LocationsConfig, MarkerConfig, OrbitNodeConfig, PositionConfig, SurfaceSiteConfig,
};
pub use validate::validate;

/// Errors that can occur while loading configuration documents.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration at `{path}`: {reason}")]
    Validation { path: String, reason: String },
}

/// Parse and validate a document from a YAML string.
pub fn from_yaml_str(contents: &str) -> Result<ConfigDocument, ConfigError> {
    let doc: ConfigDocument = serde_yaml::from_str(contents)?;
    validate(&doc)?;
    Ok(doc)
}

/// Parse and validate a document from a TOML string.
pub fn from_toml_str(contents: &str) -> Result<ConfigDocument, ConfigError> {
    let doc: ConfigDocument = toml::from_str(contents)?;
    validate(&doc)?;
    Ok(doc)
}

/// Load a document from disk, dispatching on the file extension.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<ConfigDocument, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let doc = if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        from_toml_str(&contents)?
    } else {
        from_yaml_str(&contents)?
    };
    log::debug!(
        "loaded configuration from {}: {} bodies, {} edges",
        path.display(),
        doc.bodies.len(),
        doc.transfer_edges.len()
    );
    Ok(doc)
}
