//! Access config loader (strict parsing).

pub mod schema;
pub mod yaml;

use std::fs;

use warden_core::error::{Result, WardenError};

pub use schema::{AccessConfig, DefaultsSection, FieldConfig, ListConfig};
pub use yaml::{referenced_resolvers, to_shorthand};

pub fn load_from_file(path: &str) -> Result<AccessConfig> {
    let s = fs::read_to_string(path)?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AccessConfig> {
    let cfg: AccessConfig = serde_yaml::from_str(s)
        .map_err(|e| WardenError::InvalidConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
