//! Weft: derives parser rule sets, type models and transform models from grammars.
//!
//! # Example
//!
//! ```
//! use weft_compiler::Workbench;
//!
//! let source = r#"
//!     namespace demo
//!     grammar Expressions {
//!         S = a 'b'? c ;
//!         leaf a = "[a-z]+" ;
//!         leaf c = "[0-9]+" ;
//!     }
//! "#;
//!
//! let workbench = Workbench::try_from(source).expect("grammar is valid");
//! println!("{}", workbench.type_model());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod analyze;
pub mod derive;
pub mod diagnostics;
pub mod grammar;
pub mod leaf;
pub mod normalize;
pub mod parser;
pub mod resolve;
pub mod ruleset;
pub mod source_map;
pub mod workbench;

#[cfg(test)]
mod leaf_tests;
#[cfg(test)]
mod ruleset_tests;
#[cfg(test)]
pub mod test_utils;

/// Result type for passes that produce both output and diagnostics.
///
/// Fatal errors (fuel exhaustion, malformed grammar construction) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Phase, Severity, Span};
pub use source_map::{SourceId, SourceKind, SourceLanguage, SourceMap};
pub use workbench::{Workbench, WorkbenchBuilder, WorkbenchConfig, WorkbenchParsed};

/// Errors that abort the pipeline.
///
/// Problems in user-written grammars are reported as diagnostics instead; these
/// variants cover resource limits and construction defects.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (input nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    #[error("rule `{0}` has no right-hand side")]
    RhsNotSet(String),

    #[error("right-hand side of rule `{0}` is already set")]
    RhsAlreadySet(String),

    #[error("rule `{rule}` has no sub-item at index {index}")]
    InvalidSubItem { rule: String, index: usize },

    #[error("leaf rule `{rule}`: {item} items are not yet supported")]
    UnsupportedLeafItem { rule: String, item: &'static str },

    #[error("grammar parsing failed with {} errors", .0.error_count())]
    GrammarParseError(Diagnostics),

    #[error("grammar analysis failed with {} errors", .0.error_count())]
    GrammarAnalyzeError(Diagnostics),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
