//! REPL, CLI, and model I/O for causetable.
//!
//! This crate provides:
//! - [`bif`] - Parser for Bayesian Interchange Format networks
//! - [`datasets`] - Built-in example and random datasets, discretization
//! - [`Dice`] - Arithmetic on discrete numeric distributions
//! - [`render`] - Graphviz DOT output for graphs and queries
//! - [`DagClassifier`] - Predicting one variable from the others
//! - [`serialize`] - `MessagePack` model snapshots
//! - [`Repl`] - Interactive query loop

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bif;
mod classifier;
pub mod datasets;
mod dice;
pub mod editor;
pub mod render;
mod repl;
pub mod serialize;

pub use classifier::{DagClassifier, Prediction};
pub use dice::Dice;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, Reply};
