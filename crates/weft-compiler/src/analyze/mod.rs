//! Analyses over the grammar set and rule graphs.
//!
//! - [`dependencies`]: grammar-level dependency order (extends and embedding)
//! - [`shapes`]: per-rule shape classification shared by both derivers

pub mod dependencies;
pub mod shapes;

#[cfg(test)]
mod dependencies_tests;
#[cfg(test)]
mod shapes_tests;

pub use dependencies::{GrammarDependencies, analyze_dependencies};
pub use shapes::{Field, NodeValue, RuleShape, Shapes, Value};
