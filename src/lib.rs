//! causetable - Exact causal inference over discrete observations
//!
//! This crate re-exports all layers of the causetable system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: causetable_runtime    - BIF parser, classifier, snapshots, REPL, CLI
//! Layer 2: causetable_engine     - Causal graphs, d-separation, queries
//! Layer 1: causetable_storage    - Datasets and probability tables
//! Layer 0: causetable_foundation - Core types (Value, Error)
//! ```

pub use causetable_engine as engine;
pub use causetable_foundation as foundation;
pub use causetable_runtime as runtime;
pub use causetable_storage as storage;
