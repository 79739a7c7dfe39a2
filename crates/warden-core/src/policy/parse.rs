//! Access shorthand normalization.
//!
//! Turns whatever a list or field declares (a boolean, a resolver, a granular
//! object, or a per-schema object) into a [`NormalizedAccess`] table with a
//! rule for every schema and operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::access::{
    AccessRule, FieldAccess, FieldOperation, Filter, ListAccess, ListOperation, NormalizedAccess,
    Operation, Shorthand, ValueType,
};
use crate::error::{AccessTypeMismatch, ErrorCode, Result, WardenError};

/// What differs between list-level and field-level parsing.
pub trait AccessRules {
    type Op: Operation;

    /// Operation names may not be used as schema names.
    fn reserves_operation_names(&self) -> bool;

    /// Where the declaration lives, e.g. `Post.access` or `Post.fields.title.access`.
    fn scope(&self) -> String;

    /// Declaration path for messages, e.g. `Post.access.read`.
    fn path(&self, op: Self::Op) -> String {
        format!("{}.{}", self.scope(), op.as_str())
    }

    /// Code reported when `op` is given a value it does not accept.
    fn mismatch_code(&self, op: Self::Op) -> ErrorCode;

    /// An object was given at `target` but none of its keys is an operation name.
    fn granular_parse_error(&self, target: String, received: Vec<String>) -> WardenError;

    /// `None` if `op` accepts a value of type `actual`.
    fn check_type(&self, op: Self::Op, actual: ValueType) -> Option<AccessTypeMismatch>;
}

/// Rules for `<list>.access`.
#[derive(Debug, Clone, Copy)]
pub struct ListRules<'a> {
    pub list_key: &'a str,
}

impl AccessRules for ListRules<'_> {
    type Op = ListOperation;

    fn reserves_operation_names(&self) -> bool {
        true
    }

    fn scope(&self) -> String {
        format!("{}.access", self.list_key)
    }

    fn mismatch_code(&self, op: ListOperation) -> ErrorCode {
        match op {
            ListOperation::Create => ErrorCode::InvalidCreateAccessType,
            _ => ErrorCode::InvalidListAccessType,
        }
    }

    fn granular_parse_error(&self, target: String, received: Vec<String>) -> WardenError {
        WardenError::GranularParse {
            target,
            expected: ListOperation::names(),
            received,
            hint: "Did you mean to specify a declarative access control config? This can be done on a granular basis only",
        }
    }

    fn check_type(&self, op: ListOperation, actual: ValueType) -> Option<AccessTypeMismatch> {
        match (op, actual) {
            (_, ValueType::Boolean | ValueType::Function) => None,
            (ListOperation::Create, _) => Some(AccessTypeMismatch {
                code: self.mismatch_code(op),
                path: self.path(op),
                operation: op.as_str(),
                expected: "a Boolean, or Function",
                actual,
                note: Some("'create' cannot have a declarative access control config"),
            }),
            (_, ValueType::Object) => None,
            _ => Some(AccessTypeMismatch {
                code: self.mismatch_code(op),
                path: self.path(op),
                operation: op.as_str(),
                expected: "a Boolean, Object, or Function",
                actual,
                note: None,
            }),
        }
    }
}

/// Rules for `<list>.fields.<field>.access`.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules<'a> {
    pub list_key: &'a str,
    pub field_key: &'a str,
}

impl AccessRules for FieldRules<'_> {
    type Op = FieldOperation;

    fn reserves_operation_names(&self) -> bool {
        false
    }

    fn scope(&self) -> String {
        format!("{}.fields.{}.access", self.list_key, self.field_key)
    }

    fn mismatch_code(&self, _op: FieldOperation) -> ErrorCode {
        ErrorCode::InvalidFieldAccessType
    }

    fn granular_parse_error(&self, target: String, received: Vec<String>) -> WardenError {
        WardenError::GranularParse {
            target,
            expected: FieldOperation::names(),
            received,
            hint: "Did you mean to specify a declarative access control config? This can be done on lists only",
        }
    }

    fn check_type(&self, op: FieldOperation, actual: ValueType) -> Option<AccessTypeMismatch> {
        match actual {
            ValueType::Boolean | ValueType::Function => None,
            _ => Some(AccessTypeMismatch {
                code: self.mismatch_code(op),
                path: self.path(op),
                operation: op.as_str(),
                expected: "a Boolean or Function",
                actual,
                note: Some("fields cannot have declarative access control config"),
            }),
        }
    }
}

/// Normalize list access. `access` falls back to `default` when not declared.
pub fn parse_list_access(
    list_key: &str,
    schema_names: &[String],
    access: Option<&Shorthand>,
    default: &Shorthand,
) -> Result<ListAccess> {
    let table = parse_access(
        &ListRules { list_key },
        schema_names,
        access.unwrap_or(default),
        default,
    )?;
    tracing::debug!(list = %list_key, schemas = schema_names.len(), "list access compiled");
    Ok(table)
}

/// Normalize field access. `access` falls back to `default` when not declared.
pub fn parse_field_access(
    list_key: &str,
    field_key: &str,
    schema_names: &[String],
    access: Option<&Shorthand>,
    default: &Shorthand,
) -> Result<FieldAccess> {
    let table = parse_access(
        &FieldRules {
            list_key,
            field_key,
        },
        schema_names,
        access.unwrap_or(default),
        default,
    )?;
    tracing::debug!(list = %list_key, field = %field_key, "field access compiled");
    Ok(table)
}

pub fn parse_access<R: AccessRules>(
    rules: &R,
    schema_names: &[String],
    access: &Shorthand,
    default: &Shorthand,
) -> Result<NormalizedAccess<R::Op>> {
    let scope = rules.scope();

    if rules.reserves_operation_names() {
        let reserved: Vec<String> = schema_names
            .iter()
            .filter(|name| R::Op::from_key(name).is_some())
            .cloned()
            .collect();
        if !reserved.is_empty() {
            return Err(WardenError::ReservedSchemaNames {
                target: scope,
                names: reserved,
            });
        }
    }

    let access = access.canonical();
    if let Shorthand::Object(entries) = access.as_ref() {
        let provided = entries
            .keys()
            .filter(|k| schema_names.contains(k))
            .count();

        if provided == entries.len() {
            // Every key names a schema: each schema parses its own value.
            let schemas = schema_names
                .iter()
                .map(|name| {
                    let own = entries.get(name).unwrap_or(default);
                    let target = format!("{scope}.{name}");
                    Ok((name.clone(), parse_access_core(rules, &target, own, default)?))
                })
                .collect::<Result<BTreeMap<_, _>>>()?;
            return Ok(NormalizedAccess::new(schemas));
        }

        if provided > 0 {
            let keys = entries
                .keys()
                .filter(|k| !schema_names.contains(k))
                .cloned()
                .collect();
            return Err(WardenError::MixedSchemaNames { target: scope, keys });
        }
    }

    let common = parse_access_core(rules, &scope, &access, default)?;
    let schemas = schema_names
        .iter()
        .map(|name| (name.clone(), common.clone()))
        .collect();
    Ok(NormalizedAccess::new(schemas))
}

fn parse_access_core<R: AccessRules>(
    rules: &R,
    target: &str,
    access: &Shorthand,
    default: &Shorthand,
) -> Result<BTreeMap<R::Op, AccessRule>> {
    match access.canonical().as_ref() {
        Shorthand::Boolean(b) => Ok(broadcast(AccessRule::Boolean(*b))),
        Shorthand::Function(r) => Ok(broadcast(AccessRule::Resolver(Arc::clone(r)))),
        Shorthand::Object(entries) => parse_granular(rules, target, entries, default),
        other => Err(WardenError::InvalidShorthandType {
            target: target.to_string(),
            actual: other.value_type(),
        }),
    }
}

fn broadcast<Op: Operation>(rule: AccessRule) -> BTreeMap<Op, AccessRule> {
    Op::ALL.iter().map(|op| (*op, rule.clone())).collect()
}

fn parse_granular<R: AccessRules>(
    rules: &R,
    target: &str,
    entries: &BTreeMap<String, Shorthand>,
    default: &Shorthand,
) -> Result<BTreeMap<R::Op, AccessRule>> {
    let long_hand: Vec<(R::Op, &Shorthand)> = entries
        .iter()
        .filter_map(|(k, v)| R::Op::from_key(k).map(|op| (op, v)))
        .collect();

    // Most likely a declarative filter used where per-operation access was expected.
    if long_hand.is_empty() {
        let received = entries.keys().cloned().collect();
        return Err(rules.granular_parse_error(target.to_string(), received));
    }

    let mut merged: BTreeMap<R::Op, &Shorthand> =
        R::Op::ALL.iter().map(|op| (*op, default)).collect();
    merged.extend(long_hand);

    let mut table = BTreeMap::new();
    let mut mismatches = Vec::new();
    for (op, value) in merged {
        let value = value.canonical();
        if let Some(m) = rules.check_type(op, value.value_type()) {
            mismatches.push(m);
            continue;
        }
        match to_rule(&value) {
            Some(rule) => {
                table.insert(op, rule);
            }
            None => mismatches.push(AccessTypeMismatch {
                code: rules.mismatch_code(op),
                path: rules.path(op),
                operation: op.as_str(),
                expected: "a declarative filter without nested functions",
                actual: value.value_type(),
                note: None,
            }),
        }
    }

    if !mismatches.is_empty() {
        return Err(WardenError::InvalidAccessTypes(mismatches));
    }
    Ok(table)
}

fn to_rule(value: &Shorthand) -> Option<AccessRule> {
    match value {
        Shorthand::Boolean(b) => Some(AccessRule::Boolean(*b)),
        Shorthand::Function(r) => Some(AccessRule::Resolver(Arc::clone(r))),
        Shorthand::Object(_) => match value.to_json()? {
            serde_json::Value::Object(map) => Some(AccessRule::Filter(Filter::new(map))),
            _ => None,
        },
        Shorthand::Literal(_) => None,
    }
}
