//! Shared error type across warden crates.

use std::fmt;

use thiserror::Error;

use crate::access::ValueType;

/// Error type returned by user supplied resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Who has to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Broken access declaration. Fatal at startup.
    Configuration,
    /// An access check could not produce a decision for this request.
    Runtime,
    /// The engine's own invariants were violated.
    Internal,
}

/// Stable error codes (safe to log and alert on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ReservedSchemaNames,
    InvalidShorthandType,
    MixedSchemaNames,
    GranularParse,
    InvalidAccessTypes,
    /// Per-operation mismatch: list `create` given something other than a boolean or function.
    InvalidCreateAccessType,
    /// Per-operation mismatch: list `read`/`update`/`delete`.
    InvalidListAccessType,
    /// Per-operation mismatch: any field operation.
    InvalidFieldAccessType,
    InvalidConfig,
    UnknownResolver,
    UnsupportedYaml,
    InvalidAccessReturnType,
    DeclarativeCreateNotAllowed,
    InvalidFieldAccessReturnType,
    ResolverFailed,
    UnknownList,
    UnknownField,
    MissingAccessRule,
    Io,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ReservedSchemaNames => "RESERVED_SCHEMA_NAMES",
            ErrorCode::InvalidShorthandType => "INVALID_SHORTHAND_TYPE",
            ErrorCode::MixedSchemaNames => "MIXED_SCHEMA_NAMES",
            ErrorCode::GranularParse => "GRANULAR_PARSE",
            ErrorCode::InvalidAccessTypes => "INVALID_ACCESS_TYPES",
            ErrorCode::InvalidCreateAccessType => "INVALID_CREATE_ACCESS_TYPE",
            ErrorCode::InvalidListAccessType => "INVALID_LIST_ACCESS_TYPE",
            ErrorCode::InvalidFieldAccessType => "INVALID_FIELD_ACCESS_TYPE",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::UnknownResolver => "UNKNOWN_RESOLVER",
            ErrorCode::UnsupportedYaml => "UNSUPPORTED_YAML",
            ErrorCode::InvalidAccessReturnType => "INVALID_ACCESS_RETURN_TYPE",
            ErrorCode::DeclarativeCreateNotAllowed => "DECLARATIVE_CREATE_NOT_ALLOWED",
            ErrorCode::InvalidFieldAccessReturnType => "INVALID_FIELD_ACCESS_RETURN_TYPE",
            ErrorCode::ResolverFailed => "RESOLVER_FAILED",
            ErrorCode::UnknownList => "UNKNOWN_LIST",
            ErrorCode::UnknownField => "UNKNOWN_FIELD",
            ErrorCode::MissingAccessRule => "MISSING_ACCESS_RULE",
            ErrorCode::Io => "IO",
        }
    }

    pub fn fault(self) -> FaultClass {
        match self {
            ErrorCode::ReservedSchemaNames
            | ErrorCode::InvalidShorthandType
            | ErrorCode::MixedSchemaNames
            | ErrorCode::GranularParse
            | ErrorCode::InvalidAccessTypes
            | ErrorCode::InvalidCreateAccessType
            | ErrorCode::InvalidListAccessType
            | ErrorCode::InvalidFieldAccessType
            | ErrorCode::InvalidConfig
            | ErrorCode::UnknownResolver
            | ErrorCode::UnsupportedYaml => FaultClass::Configuration,
            ErrorCode::InvalidAccessReturnType
            | ErrorCode::DeclarativeCreateNotAllowed
            | ErrorCode::InvalidFieldAccessReturnType
            | ErrorCode::ResolverFailed
            | ErrorCode::UnknownList
            | ErrorCode::UnknownField => FaultClass::Runtime,
            ErrorCode::MissingAccessRule | ErrorCode::Io => FaultClass::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation whose configured value has a type the operation does not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTypeMismatch {
    /// One of the per-operation codes (`InvalidCreateAccessType`, ...).
    pub code: ErrorCode,
    /// Declaration path, e.g. `Post.access.create` or `User.fields.email.access.read`.
    pub path: String,
    pub operation: &'static str,
    /// Human readable list of accepted types.
    pub expected: &'static str,
    pub actual: ValueType,
    pub note: Option<&'static str>,
}

impl fmt::Display for AccessTypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} for {}, but got {}",
            self.expected, self.path, self.actual
        )?;
        if let Some(note) = self.note {
            write!(f, ". (NOTE: {note})")?;
        }
        Ok(())
    }
}

fn join_lines(mismatches: &[AccessTypeMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("{target}: {names:?} are reserved words and cannot be used as schema names")]
    ReservedSchemaNames { target: String, names: Vec<String> },

    #[error("shorthand access for {target} must be specified as either a boolean or a function, received {actual}")]
    InvalidShorthandType { target: String, actual: ValueType },

    #[error("invalid schema names in {target}: {keys:?}")]
    MixedSchemaNames { target: String, keys: Vec<String> },

    #[error("must specify one of {expected:?} access configs for {target}, but got {received:?}. ({hint})")]
    GranularParse {
        target: String,
        expected: Vec<&'static str>,
        received: Vec<String>,
        hint: &'static str,
    },

    #[error("{}", join_lines(.0))]
    InvalidAccessTypes(Vec<AccessTypeMismatch>),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown resolver `{name}` referenced at {path}")]
    UnknownResolver { name: String, path: String },

    #[error("unsupported yaml at {path}: {reason}")]
    UnsupportedYaml { path: String, reason: String },

    #[error("must return an Object or Boolean from imperative or declarative access control for {target}, got {actual}")]
    InvalidAccessReturnType { target: String, actual: ValueType },

    #[error("expected a Boolean for {list_key}.access.create(), but got Object. (NOTE: 'create' cannot have a declarative access control config)")]
    DeclarativeCreateNotAllowed { list_key: String },

    #[error("must return a Boolean from {target}(), got {actual}")]
    InvalidFieldAccessReturnType { target: String, actual: ValueType },

    #[error("access resolver for {target} failed: {source}")]
    ResolverFailed {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("unknown list: {0}")]
    UnknownList(String),

    #[error("unknown field: {list_key}.{field_key}")]
    UnknownField { list_key: String, field_key: String },

    #[error("no access rule for schema `{schema}` at {target}")]
    MissingAccessRule { target: String, schema: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl WardenError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            WardenError::ReservedSchemaNames { .. } => ErrorCode::ReservedSchemaNames,
            WardenError::InvalidShorthandType { .. } => ErrorCode::InvalidShorthandType,
            WardenError::MixedSchemaNames { .. } => ErrorCode::MixedSchemaNames,
            WardenError::GranularParse { .. } => ErrorCode::GranularParse,
            WardenError::InvalidAccessTypes(_) => ErrorCode::InvalidAccessTypes,
            WardenError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            WardenError::UnknownResolver { .. } => ErrorCode::UnknownResolver,
            WardenError::UnsupportedYaml { .. } => ErrorCode::UnsupportedYaml,
            WardenError::InvalidAccessReturnType { .. } => ErrorCode::InvalidAccessReturnType,
            WardenError::DeclarativeCreateNotAllowed { .. } => {
                ErrorCode::DeclarativeCreateNotAllowed
            }
            WardenError::InvalidFieldAccessReturnType { .. } => {
                ErrorCode::InvalidFieldAccessReturnType
            }
            WardenError::ResolverFailed { .. } => ErrorCode::ResolverFailed,
            WardenError::UnknownList(_) => ErrorCode::UnknownList,
            WardenError::UnknownField { .. } => ErrorCode::UnknownField,
            WardenError::MissingAccessRule { .. } => ErrorCode::MissingAccessRule,
            WardenError::Io(_) => ErrorCode::Io,
        }
    }

    pub fn fault(&self) -> FaultClass {
        self.code().fault()
    }

    /// True for broken declarations, which must never be downgraded to a denial.
    pub fn is_configuration(&self) -> bool {
        self.fault() == FaultClass::Configuration
    }

    /// Per-operation mismatches, if this is an aggregated type error.
    pub fn mismatches(&self) -> &[AccessTypeMismatch] {
        match self {
            WardenError::InvalidAccessTypes(m) => m,
            _ => &[],
        }
    }
}
