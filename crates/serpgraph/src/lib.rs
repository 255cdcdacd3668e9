//! Public facade crate for `serpgraph`.
//!
//! This crate intentionally contains no IO or source-specific logic.
//! It re-exports the backend-agnostic types/traits from `serpgraph-core`.

pub use serpgraph_core::*;
