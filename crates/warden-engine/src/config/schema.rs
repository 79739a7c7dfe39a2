use std::collections::HashSet;

use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use warden_core::error::{Result, WardenError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessConfig {
    pub version: u32,

    /// Schema names every table is keyed by.
    #[serde(default = "default_schemas")]
    pub schemas: Vec<String>,

    #[serde(default)]
    pub defaults: DefaultsSection,

    #[serde(default)]
    pub lists: Vec<ListConfig>,
}

impl AccessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WardenError::InvalidConfig(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        if self.schemas.is_empty() {
            return Err(WardenError::InvalidConfig("schemas must not be empty".into()));
        }
        ensure_unique("schema name", self.schemas.iter().map(String::as_str))?;
        ensure_unique("list key", self.lists.iter().map(|l| l.key.as_str()))?;

        for list in &self.lists {
            list.validate()?;
        }
        Ok(())
    }
}

fn ensure_unique<'a>(what: &str, keys: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if key.is_empty() {
            return Err(WardenError::InvalidConfig(format!("{what} must not be empty")));
        }
        if !seen.insert(key) {
            return Err(WardenError::InvalidConfig(format!("duplicate {what}: {key}")));
        }
    }
    Ok(())
}

fn default_schemas() -> Vec<String> {
    vec!["public".into()]
}

/// Access used wherever a list or field declares none, and as the base
/// granular declarations are merged over.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    #[serde(default = "default_access")]
    pub list: Value,

    #[serde(default = "default_access")]
    pub field: Value,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            list: default_access(),
            field: default_access(),
        }
    }
}

fn default_access() -> Value {
    Value::Bool(true)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListConfig {
    pub key: String,

    #[serde(default, deserialize_with = "declared")]
    pub access: Option<Value>,

    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl ListConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_unique(
            &format!("field key in list {}", self.key),
            self.fields.iter().map(|f| f.key.as_str()),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub key: String,

    #[serde(default, deserialize_with = "declared")]
    pub access: Option<Value>,
}

/// `Some` whenever the key is present, so `access: ~` reaches validation as a
/// null instead of silently falling back to the default.
fn declared<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
