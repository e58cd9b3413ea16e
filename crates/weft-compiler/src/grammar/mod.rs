//! Grammar model: declared grammars, their rules and rule items.
//!
//! Grammars are built from parsed text by [`lower_grammar`] (or directly with
//! [`GrammarBuilder`]), registered in a [`GrammarSet`] and linked once all
//! sources are loaded. The model is never mutated after linking.

mod builder;
mod lower;
mod model;
mod registry;

#[cfg(test)]
mod registry_tests;

pub use builder::GrammarBuilder;
pub use lower::lower_grammar;
pub use model::{
    Grammar, GrammarId, GrammarRef, GrammarRule, ItemId, ItemNode, OverrideKind, RuleIndex,
    RuleItem, RuleRef, RuleVariant,
};
pub use registry::{GrammarSet, Lookup};
