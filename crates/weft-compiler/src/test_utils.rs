//! Test utilities and snapshot macros.

use crate::diagnostics::Diagnostics;
use crate::grammar::{GrammarSet, lower_grammar};
use crate::parser::{ParseLimits, parse_grammar};
use crate::source_map::SourceMap;

/// Snapshot test for the goal grammar's rule set.
#[macro_export]
macro_rules! shot_rules {
    ($grammar:literal, @$snapshot:literal) => {{
        let grammar = indoc::indoc!($grammar).trim();
        let output = $crate::Workbench::expect_valid_rules(grammar);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

/// Snapshot test for the goal grammar's type namespace.
#[macro_export]
macro_rules! shot_types {
    ($grammar:literal, @$snapshot:literal) => {{
        let grammar = indoc::indoc!($grammar).trim();
        let output = $crate::Workbench::expect_valid_types(grammar);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

/// Snapshot test for the goal grammar's transform unit.
#[macro_export]
macro_rules! shot_transforms {
    ($grammar:literal, @$snapshot:literal) => {{
        let grammar = indoc::indoc!($grammar).trim();
        let output = $crate::Workbench::expect_valid_transforms(grammar);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

/// Snapshot test for diagnostics of an invalid grammar.
#[macro_export]
macro_rules! shot_error {
    ($grammar:literal, @$snapshot:literal) => {{
        let grammar = indoc::indoc!($grammar).trim();
        let output = $crate::Workbench::expect_invalid(grammar);
        insta::assert_snapshot!(output, @$snapshot);
    }};
}

/// Parse, lower, register and link every grammar in `source`.
#[track_caller]
pub fn load_grammars(source: &str) -> (GrammarSet, Diagnostics) {
    let map = SourceMap::one_liner(source);
    let id = map.iter().next().unwrap().id;
    let (file, mut diagnostics) = parse_grammar(source, id, ParseLimits::default()).unwrap();
    let mut grammars = GrammarSet::new();
    for decl in &file.grammars {
        grammars.add(lower_grammar(decl, id).unwrap(), &mut diagnostics);
    }
    grammars.link(&mut diagnostics);
    (grammars, diagnostics)
}
