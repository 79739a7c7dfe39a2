//! Imperative access: resolver functions and the arguments they receive.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BoxError;

/// Who is making the request. Empty when there is no session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationContext {
    /// The authenticated item (e.g. the signed in user).
    #[serde(default)]
    pub item: Option<Value>,
    /// List the authenticated item belongs to.
    #[serde(default, rename = "listKey")]
    pub list_key: Option<String>,
}

impl AuthenticationContext {
    pub fn new(list_key: impl Into<String>, item: Value) -> Self {
        Self {
            item: Some(item),
            list_key: Some(list_key.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.item.is_some()
    }

    /// What a resolver gets to see: the context only if it carries an item.
    pub fn for_resolver(&self) -> Self {
        if self.is_authenticated() {
            self.clone()
        } else {
            Self::default()
        }
    }
}

/// Argument bundle handed to a resolver.
#[derive(Debug, Clone, Default)]
pub struct ResolverArgs {
    pub authentication: AuthenticationContext,
    /// Payload being written (create/update).
    pub original_input: Option<Value>,
    /// Stored record before the mutation. Field checks only.
    pub existing_item: Option<Value>,
}

/// A function deciding access per request.
///
/// Must return a JSON boolean, or (list `read`/`update`/`delete` only) a JSON
/// object used as a declarative filter. Anything else is rejected after the call.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, args: ResolverArgs) -> std::result::Result<Value, BoxError>;
}

/// Adapter turning an async closure into a [`Resolver`].
pub struct FnResolver<F>(F);

#[async_trait]
impl<F, Fut> Resolver for FnResolver<F>
where
    F: Fn(ResolverArgs) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, BoxError>> + Send + 'static,
{
    async fn resolve(&self, args: ResolverArgs) -> std::result::Result<Value, BoxError> {
        (self.0)(args).await
    }
}

pub fn resolver_fn<F, Fut>(f: F) -> Arc<dyn Resolver>
where
    F: Fn(ResolverArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Value, BoxError>> + Send + 'static,
{
    Arc::new(FnResolver(f))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn resolver_sees_empty_context_without_item() {
        let ctx = AuthenticationContext {
            item: None,
            list_key: Some("User".into()),
        };
        assert_eq!(ctx.for_resolver(), AuthenticationContext::default());

        let ctx = AuthenticationContext::new("User", json!({ "id": "u1" }));
        assert_eq!(ctx.for_resolver(), ctx);
    }

    #[tokio::test]
    async fn closures_resolve() {
        let r = resolver_fn(|args: ResolverArgs| async move {
            Ok(json!(args.authentication.is_authenticated()))
        });
        let out = r
            .resolve(ResolverArgs {
                authentication: AuthenticationContext::new("User", json!({ "id": 1 })),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(out, json!(true));
    }
}
