//! User-supplied access shorthand, classified once at ingestion.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::resolver::Resolver;

/// Runtime type of a configured or resolved access value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Boolean,
    Function,
    Object,
    String,
    Number,
    Null,
    Array,
}

impl ValueType {
    pub fn of_json(value: &Value) -> Self {
        match value {
            Value::Bool(_) => ValueType::Boolean,
            Value::Object(_) => ValueType::Object,
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Null => ValueType::Null,
            Value::Array(_) => ValueType::Array,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Boolean => "Boolean",
            ValueType::Function => "Function",
            ValueType::Object => "Object",
            ValueType::String => "String",
            ValueType::Number => "Number",
            ValueType::Null => "Null",
            ValueType::Array => "Array",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access as declared on a list or field.
///
/// `Object` covers granular objects (`{read: true}`), per-schema objects
/// (`{public: true}`) and declarative filter literals; which one it is depends
/// on where it appears. `Literal` holds every other JSON value and never
/// passes validation, but keeps its type for error messages.
#[derive(Clone)]
pub enum Shorthand {
    Boolean(bool),
    Function(Arc<dyn Resolver>),
    Object(BTreeMap<String, Shorthand>),
    Literal(Value),
}

impl Shorthand {
    pub fn function<R: Resolver + 'static>(resolver: R) -> Self {
        Shorthand::Function(Arc::new(resolver))
    }

    pub fn object<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Shorthand)>,
        K: Into<String>,
    {
        Shorthand::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Shorthand::Boolean(_) => ValueType::Boolean,
            Shorthand::Function(_) => ValueType::Function,
            Shorthand::Object(_) => ValueType::Object,
            Shorthand::Literal(v) => ValueType::of_json(v),
        }
    }

    /// The same value with `Literal` booleans and objects lifted into their own
    /// variants, so a hand-built `Literal(json!(true))` parses like `Boolean(true)`.
    pub fn canonical(&self) -> Cow<'_, Shorthand> {
        match self {
            Shorthand::Literal(v @ (Value::Bool(_) | Value::Object(_))) => {
                Cow::Owned(Shorthand::from(v.clone()))
            }
            _ => Cow::Borrowed(self),
        }
    }

    /// JSON form of a function-free value. `None` if a resolver is nested inside.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Shorthand::Boolean(b) => Some(Value::Bool(*b)),
            Shorthand::Function(_) => None,
            Shorthand::Literal(v) => Some(v.clone()),
            Shorthand::Object(entries) => entries
                .iter()
                .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                .collect::<Option<Map<String, Value>>>()
                .map(Value::Object),
        }
    }
}

impl fmt::Debug for Shorthand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shorthand::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            Shorthand::Function(_) => f.write_str("Function"),
            Shorthand::Object(entries) => f.debug_tuple("Object").field(entries).finish(),
            Shorthand::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
        }
    }
}

impl From<bool> for Shorthand {
    fn from(b: bool) -> Self {
        Shorthand::Boolean(b)
    }
}

impl From<Arc<dyn Resolver>> for Shorthand {
    fn from(resolver: Arc<dyn Resolver>) -> Self {
        Shorthand::Function(resolver)
    }
}

impl From<Value> for Shorthand {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(b) => Shorthand::Boolean(b),
            Value::Object(map) => {
                Shorthand::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            other => Shorthand::Literal(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::access::resolver::resolver_fn;

    #[test]
    fn json_objects_become_nested_shorthand() {
        let s = Shorthand::from(json!({ "read": { "status": "published" }, "create": false }));
        let Shorthand::Object(entries) = &s else {
            panic!("expected object, got {s:?}");
        };
        assert!(matches!(entries["create"], Shorthand::Boolean(false)));
        assert_eq!(entries["read"].value_type(), ValueType::Object);
        assert_eq!(s.to_json(), Some(json!({ "read": { "status": "published" }, "create": false })));
    }

    #[test]
    fn scalars_keep_their_type() {
        assert_eq!(Shorthand::from(json!("yes")).value_type(), ValueType::String);
        assert_eq!(Shorthand::from(json!(1)).value_type(), ValueType::Number);
        assert_eq!(Shorthand::from(json!(null)).value_type(), ValueType::Null);
        assert_eq!(Shorthand::from(json!([true])).value_type(), ValueType::Array);
    }

    #[test]
    fn canonical_lifts_boolean_and_object_literals() {
        let b = Shorthand::Literal(json!(false));
        assert!(matches!(b.canonical().as_ref(), Shorthand::Boolean(false)));

        let o = Shorthand::Literal(json!({ "read": true }));
        let Shorthand::Object(entries) = o.canonical().into_owned() else {
            panic!("expected object");
        };
        assert!(matches!(entries["read"], Shorthand::Boolean(true)));

        let s = Shorthand::Literal(json!("yes"));
        assert!(matches!(s.canonical(), Cow::Borrowed(Shorthand::Literal(_))));
    }

    #[test]
    fn nested_function_has_no_json_form() {
        let s = Shorthand::object([(
            "author",
            Shorthand::Function(resolver_fn(|_| async { Ok(json!(true)) })),
        )]);
        assert_eq!(s.value_type(), ValueType::Object);
        assert!(s.to_json().is_none());
    }
}
