//! Policy layer (normalization and evaluation).
//!
//! Normalization compiles access declarations into tables once at startup;
//! evaluation consults those tables per request.

pub mod evaluate;
pub mod parse;

pub use evaluate::{validate_field_access, validate_list_access, FieldAccessCheck, ListAccessCheck};
pub use parse::{
    parse_access, parse_field_access, parse_list_access, AccessRules, FieldRules, ListRules,
};
