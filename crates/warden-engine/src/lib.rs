//! warden engine library entry.
//!
//! This crate wires config loading, the resolver registry and the compiled
//! access tables into one `AccessControl` handle. It is consumed by the
//! `warden-check` binary and by host applications embedding the engine.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod check;
pub mod config;
pub mod control;
pub mod registry;

pub use control::{AccessControl, CompiledList};
pub use registry::ResolverRegistry;
