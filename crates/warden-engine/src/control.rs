//! Compiled access control for a whole deployment.
//!
//! Every list and field declaration is normalized once in `AccessControl::new`;
//! afterwards the tables are read-only and shared between requests via `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use warden_core::access::{AccessResult, FieldAccess, ListAccess};
use warden_core::error::{Result, WardenError};
use warden_core::policy::{
    parse_field_access, parse_list_access, validate_field_access, validate_list_access,
    FieldAccessCheck, ListAccessCheck,
};

use crate::config::{yaml::to_shorthand, AccessConfig};
use crate::registry::ResolverRegistry;

/// Tables for one list and its fields.
#[derive(Debug, Clone)]
pub struct CompiledList {
    pub access: ListAccess,
    pub fields: HashMap<String, FieldAccess>,
}

#[derive(Clone)]
pub struct AccessControl {
    inner: Arc<AccessControlInner>,
}

struct AccessControlInner {
    schema_names: Vec<String>,
    lists: HashMap<String, CompiledList>,
}

impl AccessControl {
    /// Compile every declaration in `cfg`. Any error here is a configuration fault.
    pub fn new(cfg: &AccessConfig, registry: &ResolverRegistry) -> Result<Self> {
        cfg.validate()?;

        let default_list = to_shorthand(&cfg.defaults.list, registry, "defaults.list")?;
        let default_field = to_shorthand(&cfg.defaults.field, registry, "defaults.field")?;

        let mut lists = HashMap::with_capacity(cfg.lists.len());
        for list in &cfg.lists {
            let access = list
                .access
                .as_ref()
                .map(|v| to_shorthand(v, registry, &format!("{}.access", list.key)))
                .transpose()?;
            let table = parse_list_access(&list.key, &cfg.schemas, access.as_ref(), &default_list)?;

            let mut fields = HashMap::with_capacity(list.fields.len());
            for field in &list.fields {
                let path = format!("{}.fields.{}.access", list.key, field.key);
                let access = field
                    .access
                    .as_ref()
                    .map(|v| to_shorthand(v, registry, &path))
                    .transpose()?;
                let table = parse_field_access(
                    &list.key,
                    &field.key,
                    &cfg.schemas,
                    access.as_ref(),
                    &default_field,
                )?;
                fields.insert(field.key.clone(), table);
            }

            tracing::debug!(list = %list.key, fields = fields.len(), "list compiled");
            lists.insert(list.key.clone(), CompiledList { access: table, fields });
        }

        tracing::info!(
            lists = lists.len(),
            schemas = cfg.schemas.len(),
            "access control compiled"
        );

        Ok(Self {
            inner: Arc::new(AccessControlInner {
                schema_names: cfg.schemas.clone(),
                lists,
            }),
        })
    }

    pub fn schema_names(&self) -> &[String] {
        &self.inner.schema_names
    }

    /// List keys, sorted.
    pub fn list_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.inner.lists.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn list(&self, list_key: &str) -> Option<&CompiledList> {
        self.inner.lists.get(list_key)
    }

    pub fn list_access(&self, list_key: &str) -> Option<&ListAccess> {
        self.list(list_key).map(|l| &l.access)
    }

    pub fn field_access(&self, list_key: &str, field_key: &str) -> Option<&FieldAccess> {
        self.list(list_key).and_then(|l| l.fields.get(field_key))
    }

    pub async fn validate_list_access(&self, check: ListAccessCheck<'_>) -> Result<AccessResult> {
        let access = self
            .list_access(check.list_key)
            .ok_or_else(|| WardenError::UnknownList(check.list_key.to_string()))?;
        validate_list_access(access, check).await
    }

    pub async fn validate_field_access(&self, check: FieldAccessCheck<'_>) -> Result<bool> {
        let access = self.field_access(check.list_key, check.field_key).ok_or_else(|| {
            WardenError::UnknownField {
                list_key: check.list_key.to_string(),
                field_key: check.field_key.to_string(),
            }
        })?;
        validate_field_access(access, check).await
    }
}
