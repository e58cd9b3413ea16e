//! Type and transform model derivation.
//!
//! Both derivers read the same [`Shapes`](crate::analyze::Shapes), so every
//! constructed type has exactly the properties its transform assigns.

mod overrides;
mod transform;
mod types;

#[cfg(test)]
mod overrides_tests;
#[cfg(test)]
mod transform_tests;
#[cfg(test)]
mod types_tests;

pub use overrides::OverrideMerger;
pub use transform::derive_transforms;
pub use types::{GoalTypes, derive_types};
