//! Access data model: operations, shorthand, resolvers and normalized tables.

pub mod operation;
pub mod resolver;
pub mod shorthand;
pub mod table;

pub use operation::{FieldOperation, ListOperation, Operation};
pub use resolver::{resolver_fn, AuthenticationContext, FnResolver, Resolver, ResolverArgs};
pub use shorthand::{Shorthand, ValueType};
pub use table::{AccessResult, AccessRule, FieldAccess, Filter, ListAccess, NormalizedAccess};
