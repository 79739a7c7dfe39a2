//! Top-level facade crate for warden.
//!
//! Re-exports the core model and the engine so users can depend on a single crate.

pub mod core {
    pub use warden_core::*;
}

pub mod engine {
    pub use warden_engine::*;
}
