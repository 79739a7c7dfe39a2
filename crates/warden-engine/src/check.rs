//! Offline compile of an access config, as run by `warden-check`.
//!
//! Resolvers live in the host application, so every `!resolver` name found in
//! the config is bound to a stand-in that denies access.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use warden_core::access::{Resolver, ResolverArgs};
use warden_core::error::{BoxError, Result};

use crate::config;
use crate::control::AccessControl;
use crate::registry::ResolverRegistry;

/// Resolver bound in place of the application's own; always denies.
pub struct StandIn;

#[async_trait]
impl Resolver for StandIn {
    async fn resolve(&self, _args: ResolverArgs) -> std::result::Result<Value, BoxError> {
        Ok(Value::Bool(false))
    }
}

/// Load `path` and compile it with stand-in resolvers.
pub fn check_file(path: &str) -> Result<AccessControl> {
    let cfg = config::load_from_file(path)?;

    let registry = ResolverRegistry::new();
    for name in config::referenced_resolvers(&cfg)? {
        tracing::debug!(resolver = %name, "binding stand-in resolver");
        registry.register(name, Arc::new(StandIn));
    }

    AccessControl::new(&cfg, &registry)
}
