use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use warden_core::access::{resolver_fn, Resolver, ResolverArgs};
use warden_core::error::BoxError;

/// Named resolvers that access configs refer to with `!resolver <name>`.
///
/// Filled once at startup by the host application, then read concurrently.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: DashMap<String, Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self {
            resolvers: DashMap::new(),
        }
    }

    /// Register `resolver` under `name`, returning the one it replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        resolver: Arc<dyn Resolver>,
    ) -> Option<Arc<dyn Resolver>> {
        let name = name.into();
        let replaced = self.resolvers.insert(name.clone(), resolver);
        if replaced.is_some() {
            tracing::warn!(resolver = %name, "resolver replaced");
        }
        replaced
    }

    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F) -> Option<Arc<dyn Resolver>>
    where
        F: Fn(ResolverArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        self.register(name, resolver_fn(f))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Resolver>> {
        self.resolvers.get(name).map(|e| Arc::clone(e.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resolvers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn register_and_lookup() {
        let registry = ResolverRegistry::new();
        assert!(registry
            .register_fn("is_admin", |args: ResolverArgs| async move {
                Ok(json!(args.authentication.is_authenticated()))
            })
            .is_none());
        registry.register_fn("anyone", |_| async { Ok(json!(true)) });

        assert_eq!(registry.names(), vec!["anyone", "is_admin"]);
        assert!(registry.contains("anyone"));
        assert!(registry.get("nobody").is_none());

        let r = registry.get("is_admin").unwrap();
        assert_eq!(r.resolve(ResolverArgs::default()).await.unwrap(), json!(false));
    }

    #[test]
    fn re_registering_returns_previous() {
        let registry = ResolverRegistry::new();
        let first = resolver_fn(|_| async { Ok(json!(true)) });
        registry.register("r", Arc::clone(&first));
        let replaced = registry
            .register("r", resolver_fn(|_| async { Ok(json!(false)) }))
            .unwrap();
        assert!(Arc::ptr_eq(&replaced, &first));
    }
}
