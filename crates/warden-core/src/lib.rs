//! warden core: access-control data model, normalization and evaluation.
//!
//! This crate turns access declarations into normalized per-schema,
//! per-operation tables and evaluates them per request. It carries no
//! config-file or runtime dependencies so it can be embedded anywhere a
//! request layer needs a permission or a filter.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied outside tests.
//! A broken declaration or a misbehaving resolver surfaces as a
//! `WardenError`, never as a crash or a silent denial.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod access;
pub mod error;
pub mod policy;

/// Shared result type.
pub use error::{Result, WardenError};
