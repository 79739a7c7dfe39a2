//! YAML access values -> `Shorthand`.
//!
//! Booleans, mappings and scalars map one to one. Resolvers are written as
//! `!resolver <name>` and looked up in the registry.

use std::collections::{BTreeMap, BTreeSet};

use serde_yaml::Value;
use warden_core::access::Shorthand;
use warden_core::error::{Result, WardenError};

use super::schema::AccessConfig;
use crate::registry::ResolverRegistry;

pub const RESOLVER_TAG: &str = "resolver";

/// Convert one access value. `path` is only used in error messages.
pub fn to_shorthand(value: &Value, registry: &ResolverRegistry, path: &str) -> Result<Shorthand> {
    match value {
        Value::Bool(b) => Ok(Shorthand::Boolean(*b)),
        Value::Mapping(mapping) => {
            let mut entries = BTreeMap::new();
            for (k, v) in mapping {
                let key = k.as_str().ok_or_else(|| WardenError::UnsupportedYaml {
                    path: path.to_string(),
                    reason: "mapping keys must be strings".into(),
                })?;
                let child = to_shorthand(v, registry, &format!("{path}.{key}"))?;
                entries.insert(key.to_string(), child);
            }
            Ok(Shorthand::Object(entries))
        }
        Value::Tagged(tagged) => {
            let name = resolver_name(value, path)?;
            let resolver = registry
                .get(name)
                .ok_or_else(|| WardenError::UnknownResolver {
                    name: name.to_string(),
                    path: path.to_string(),
                })?;
            tracing::trace!(%path, resolver = %name, tag = %tagged.tag, "resolver bound");
            Ok(Shorthand::Function(resolver))
        }
        other => {
            let json = serde_json::to_value(other).map_err(|e| WardenError::UnsupportedYaml {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Shorthand::from(json))
        }
    }
}

fn resolver_name<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    let Value::Tagged(tagged) = value else {
        return Err(WardenError::UnsupportedYaml {
            path: path.to_string(),
            reason: "expected a tagged value".into(),
        });
    };
    if tagged.tag != RESOLVER_TAG {
        return Err(WardenError::UnsupportedYaml {
            path: path.to_string(),
            reason: format!("unsupported tag {}", tagged.tag),
        });
    }
    tagged
        .value
        .as_str()
        .ok_or_else(|| WardenError::UnsupportedYaml {
            path: path.to_string(),
            reason: "!resolver expects a resolver name".into(),
        })
}

/// Every resolver name a config refers to, sorted.
pub fn referenced_resolvers(cfg: &AccessConfig) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    collect(&cfg.defaults.list, "defaults.list", &mut out)?;
    collect(&cfg.defaults.field, "defaults.field", &mut out)?;
    for list in &cfg.lists {
        if let Some(access) = &list.access {
            collect(access, &format!("{}.access", list.key), &mut out)?;
        }
        for field in &list.fields {
            if let Some(access) = &field.access {
                let path = format!("{}.fields.{}.access", list.key, field.key);
                collect(access, &path, &mut out)?;
            }
        }
    }
    Ok(out)
}

fn collect(value: &Value, path: &str, out: &mut BTreeSet<String>) -> Result<()> {
    match value {
        Value::Tagged(_) => {
            out.insert(resolver_name(value, path)?.to_string());
        }
        Value::Mapping(mapping) => {
            for (k, v) in mapping {
                let key = k.as_str().unwrap_or("?");
                collect(v, &format!("{path}.{key}"), out)?;
            }
        }
        _ => {}
    }
    Ok(())
}
