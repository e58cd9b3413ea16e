#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for weft derived models.
//!
//! A grammar compiles into three read-only artifacts:
//! - [`RuleSet`]: the normalized rule graph consumed by a parser
//! - [`TypeModel`]: structural types describing parse results
//! - [`TransformModel`]: construction rules mapping parse results to values
//!
//! All of them serialize to JSON and to a compact binary form via [`ModelBundle`].

mod bundle;
mod name;
pub mod rules;
pub mod transform;
pub mod types;
pub mod utils;

#[cfg(test)]
mod name_tests;
#[cfg(test)]
mod transform_tests;

pub use bundle::{BundleError, ModelBundle};
pub use name::{IndexPath, QualifiedName};
pub use rules::{ChoiceKind, RuleDef, RuleExpr, RuleSet, Terminal};
pub use transform::{
    Assignment, Construction, Expr, TransformModel, TransformOrigin, TransformRule, TransformUnit,
    WhenBranch,
};
pub use types::{
    DataType, PrimitiveType, Property, TypeDecl, TypeExpr, TypeModel, TypeNamespace, TypeRef,
    UnionType,
};
