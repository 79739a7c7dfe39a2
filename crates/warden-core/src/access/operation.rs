//! Operation kinds for list-level and field-level access.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A closed set of operations an access table is keyed by.
pub trait Operation:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Every operation in declaration order.
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == key)
    }

    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|op| op.as_str()).collect()
    }
}

/// Operations on a whole list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation for ListOperation {
    const ALL: &'static [Self] = &[
        ListOperation::Create,
        ListOperation::Read,
        ListOperation::Update,
        ListOperation::Delete,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ListOperation::Create => "create",
            ListOperation::Read => "read",
            ListOperation::Update => "update",
            ListOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for ListOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations on a single field. Fields are only deleted with their item,
/// so there is no `Delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldOperation {
    Create,
    Read,
    Update,
}

impl Operation for FieldOperation {
    const ALL: &'static [Self] = &[
        FieldOperation::Create,
        FieldOperation::Read,
        FieldOperation::Update,
    ];

    fn as_str(self) -> &'static str {
        match self {
            FieldOperation::Create => "create",
            FieldOperation::Read => "read",
            FieldOperation::Update => "update",
        }
    }
}

impl fmt::Display for FieldOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FieldOperation> for ListOperation {
    fn from(op: FieldOperation) -> Self {
        match op {
            FieldOperation::Create => ListOperation::Create,
            FieldOperation::Read => ListOperation::Read,
            FieldOperation::Update => ListOperation::Update,
        }
    }
}
