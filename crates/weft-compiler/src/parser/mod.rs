//! Parsers for grammar text and transform-override text.
//!
//! Both languages share the lexer and the [`core::Parser`] state. Parsing never
//! fails on malformed input: errors become diagnostics and the parser resumes
//! at the next rule or block boundary. Only resource limits abort.

pub mod ast;
mod core;
mod grammar_text;
pub mod lexer;
mod transform_text;

#[cfg(test)]
mod transform_text_tests;

pub use ast::{GrammarFile, TransformFile};
pub use core::Parser;

use crate::{PassResult, SourceId};

/// Limits applied to a single parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseLimits {
    pub exec_fuel: Option<u32>,
    pub recursion_limit: Option<u32>,
}

/// Parse grammar text.
pub fn parse_grammar(source: &str, id: SourceId, limits: ParseLimits) -> PassResult<GrammarFile> {
    let tokens = lexer::lex(source);
    let mut parser = Parser::new(source, id, tokens)
        .with_exec_fuel(limits.exec_fuel)
        .with_recursion_fuel(limits.recursion_limit);
    let file = parser.parse_grammar_file();
    tracing::trace!(grammars = file.grammars.len(), "parsed grammar text");
    parser.finish(file)
}

/// Parse transform-override text.
pub fn parse_transform(
    source: &str,
    id: SourceId,
    limits: ParseLimits,
) -> PassResult<TransformFile> {
    let tokens = lexer::lex(source);
    let mut parser = Parser::new(source, id, tokens)
        .with_exec_fuel(limits.exec_fuel)
        .with_recursion_fuel(limits.recursion_limit);
    let file = parser.parse_transform_file();
    tracing::trace!(scopes = file.scopes.len(), "parsed transform text");
    parser.finish(file)
}
