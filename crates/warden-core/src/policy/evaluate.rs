//! Runtime access checks against a normalized table.
//!
//! Each check looks up one rule, awaits it if it is a resolver, and validates
//! what came back. Nothing is cached: resolvers may depend on request data.

use std::sync::Arc;

use serde_json::Value;

use crate::access::{
    AccessResult, AccessRule, AuthenticationContext, FieldAccess, FieldOperation, Filter,
    ListAccess, ListOperation, Resolver, ResolverArgs, ValueType,
};
use crate::error::{Result, WardenError};

/// A list-level access check.
#[derive(Debug, Clone, Copy)]
pub struct ListAccessCheck<'a> {
    pub list_key: &'a str,
    pub schema: &'a str,
    pub operation: ListOperation,
    pub authentication: &'a AuthenticationContext,
    pub original_input: Option<&'a Value>,
}

impl<'a> ListAccessCheck<'a> {
    pub fn new(
        list_key: &'a str,
        schema: &'a str,
        operation: ListOperation,
        authentication: &'a AuthenticationContext,
    ) -> Self {
        Self {
            list_key,
            schema,
            operation,
            authentication,
            original_input: None,
        }
    }

    pub fn with_original_input(mut self, input: &'a Value) -> Self {
        self.original_input = Some(input);
        self
    }

    fn target(&self) -> String {
        format!("{}.access.{}", self.list_key, self.operation)
    }
}

/// A field-level access check.
#[derive(Debug, Clone, Copy)]
pub struct FieldAccessCheck<'a> {
    pub list_key: &'a str,
    pub field_key: &'a str,
    pub schema: &'a str,
    pub operation: FieldOperation,
    pub authentication: &'a AuthenticationContext,
    pub original_input: Option<&'a Value>,
    pub existing_item: Option<&'a Value>,
}

impl<'a> FieldAccessCheck<'a> {
    pub fn new(
        list_key: &'a str,
        field_key: &'a str,
        schema: &'a str,
        operation: FieldOperation,
        authentication: &'a AuthenticationContext,
    ) -> Self {
        Self {
            list_key,
            field_key,
            schema,
            operation,
            authentication,
            original_input: None,
            existing_item: None,
        }
    }

    pub fn with_original_input(mut self, input: &'a Value) -> Self {
        self.original_input = Some(input);
        self
    }

    pub fn with_existing_item(mut self, item: &'a Value) -> Self {
        self.existing_item = Some(item);
        self
    }

    fn target(&self) -> String {
        format!(
            "{}.fields.{}.access.{}",
            self.list_key, self.field_key, self.operation
        )
    }
}

/// Decide list-level access: a boolean, or a filter for `read`/`update`/`delete`.
pub async fn validate_list_access(
    access: &ListAccess,
    check: ListAccessCheck<'_>,
) -> Result<AccessResult> {
    let target = check.target();
    let rule = access
        .get(check.schema, check.operation)
        .ok_or_else(|| WardenError::MissingAccessRule {
            target: target.clone(),
            schema: check.schema.to_string(),
        })?;

    let result = match rule {
        AccessRule::Boolean(allowed) => AccessResult::Boolean(*allowed),
        AccessRule::Filter(filter) => AccessResult::Filter(filter.clone()),
        AccessRule::Resolver(resolver) => {
            let args = ResolverArgs {
                authentication: check.authentication.for_resolver(),
                original_input: check.original_input.cloned(),
                existing_item: None,
            };
            match resolve(resolver, args, &target).await? {
                Value::Bool(allowed) => AccessResult::Boolean(allowed),
                Value::Object(map) => AccessResult::Filter(Filter::new(map)),
                other => {
                    let actual = ValueType::of_json(&other);
                    tracing::warn!(%target, %actual, "access resolver returned an invalid type");
                    return Err(WardenError::InvalidAccessReturnType { target, actual });
                }
            }
        }
    };

    if check.operation == ListOperation::Create && matches!(result, AccessResult::Filter(_)) {
        tracing::warn!(%target, "declarative result for create");
        return Err(WardenError::DeclarativeCreateNotAllowed {
            list_key: check.list_key.to_string(),
        });
    }

    tracing::debug!(%target, schema = %check.schema, ?result, "list access decided");
    Ok(result)
}

/// Decide field-level access. Fields never take a filter.
pub async fn validate_field_access(access: &FieldAccess, check: FieldAccessCheck<'_>) -> Result<bool> {
    let target = check.target();
    let rule = access
        .get(check.schema, check.operation)
        .ok_or_else(|| WardenError::MissingAccessRule {
            target: target.clone(),
            schema: check.schema.to_string(),
        })?;

    let candidate = match rule {
        AccessRule::Boolean(allowed) => Value::Bool(*allowed),
        AccessRule::Filter(filter) => Value::Object(filter.as_map().clone()),
        AccessRule::Resolver(resolver) => {
            let args = ResolverArgs {
                authentication: check.authentication.for_resolver(),
                original_input: check.original_input.cloned(),
                existing_item: check.existing_item.cloned(),
            };
            resolve(resolver, args, &target).await?
        }
    };

    let allowed = match candidate {
        Value::Bool(allowed) => allowed,
        other => {
            let actual = ValueType::of_json(&other);
            tracing::warn!(%target, %actual, "field access returned a non-boolean");
            return Err(WardenError::InvalidFieldAccessReturnType { target, actual });
        }
    };

    tracing::debug!(%target, schema = %check.schema, allowed, "field access decided");
    Ok(allowed)
}

async fn resolve(resolver: &Arc<dyn Resolver>, args: ResolverArgs, target: &str) -> Result<Value> {
    resolver.resolve(args).await.map_err(|source| {
        tracing::warn!(%target, error = %source, "access resolver failed");
        WardenError::ResolverFailed {
            target: target.to_string(),
            source,
        }
    })
}
