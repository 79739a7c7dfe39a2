//! Normalized access tables and the values stored in them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::operation::{FieldOperation, ListOperation, Operation};
use super::resolver::Resolver;
use super::shorthand::{Shorthand, ValueType};

/// Declarative filter. Opaque here; the query layer owns its shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Filter> for Value {
    fn from(filter: Filter) -> Self {
        Value::Object(filter.0)
    }
}

/// One table slot.
#[derive(Clone)]
pub enum AccessRule {
    Boolean(bool),
    Resolver(Arc<dyn Resolver>),
    Filter(Filter),
}

impl AccessRule {
    pub fn value_type(&self) -> ValueType {
        match self {
            AccessRule::Boolean(_) => ValueType::Boolean,
            AccessRule::Resolver(_) => ValueType::Function,
            AccessRule::Filter(_) => ValueType::Object,
        }
    }

    pub fn to_shorthand(&self) -> Shorthand {
        match self {
            AccessRule::Boolean(b) => Shorthand::Boolean(*b),
            AccessRule::Resolver(r) => Shorthand::Function(Arc::clone(r)),
            AccessRule::Filter(f) => Shorthand::from(Value::Object(f.as_map().clone())),
        }
    }
}

/// Resolvers compare by identity.
impl PartialEq for AccessRule {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AccessRule::Boolean(a), AccessRule::Boolean(b)) => a == b,
            (AccessRule::Resolver(a), AccessRule::Resolver(b)) => Arc::ptr_eq(a, b),
            (AccessRule::Filter(a), AccessRule::Filter(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessRule::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            AccessRule::Resolver(_) => f.write_str("Resolver"),
            AccessRule::Filter(filter) => f.debug_tuple("Filter").field(filter).finish(),
        }
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessRule::Boolean(b) => write!(f, "{b}"),
            AccessRule::Resolver(_) => f.write_str("resolver"),
            AccessRule::Filter(filter) => write!(f, "filter {}", Value::Object(filter.as_map().clone())),
        }
    }
}

/// Outcome of a list-level check.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessResult {
    Boolean(bool),
    /// Access is granted for items matching the filter.
    Filter(Filter),
}

impl AccessResult {
    /// Only a literal `false` denies outright; a filter may still match items.
    pub fn is_denied(&self) -> bool {
        matches!(self, AccessResult::Boolean(false))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AccessResult::Boolean(b) => Some(*b),
            AccessResult::Filter(_) => None,
        }
    }

    pub fn filter(&self) -> Option<&Filter> {
        match self {
            AccessResult::Filter(f) => Some(f),
            AccessResult::Boolean(_) => None,
        }
    }
}

/// Schema name -> operation -> rule, with every slot filled.
///
/// Only built by the normalizer, so lookups for a known schema never miss.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAccess<Op: Operation> {
    schemas: BTreeMap<String, BTreeMap<Op, AccessRule>>,
}

pub type ListAccess = NormalizedAccess<ListOperation>;
pub type FieldAccess = NormalizedAccess<FieldOperation>;

impl<Op: Operation> NormalizedAccess<Op> {
    pub(crate) fn new(schemas: BTreeMap<String, BTreeMap<Op, AccessRule>>) -> Self {
        Self { schemas }
    }

    pub fn get(&self, schema: &str, op: Op) -> Option<&AccessRule> {
        self.schemas.get(schema).and_then(|ops| ops.get(&op))
    }

    pub fn schema(&self, schema: &str) -> Option<&BTreeMap<Op, AccessRule>> {
        self.schemas.get(schema)
    }

    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Op, &AccessRule)> {
        self.schemas
            .iter()
            .flat_map(|(name, ops)| ops.iter().map(move |(op, rule)| (name.as_str(), *op, rule)))
    }

    /// Per-schema granular shorthand that normalizes back to this table.
    pub fn to_shorthand(&self) -> Shorthand {
        Shorthand::Object(
            self.schemas
                .iter()
                .map(|(name, ops)| {
                    let granular = ops
                        .iter()
                        .map(|(op, rule)| (op.as_str().to_string(), rule.to_shorthand()))
                        .collect();
                    (name.clone(), Shorthand::Object(granular))
                })
                .collect(),
        )
    }
}
