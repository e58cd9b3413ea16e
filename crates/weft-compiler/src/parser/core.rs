//! Parser state machine and low-level operations.

use rowan::{TextRange, TextSize};

use super::lexer::{SyntaxKind, Token, TokenSet, token_text};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::{Error, PassResult, SourceId};

/// Recursive-descent parser over a trivia-free token stream.
///
/// Both text languages share this state; their productions live in
/// `grammar_text` and `transform_text`.
pub struct Parser<'src> {
    pub(super) source: &'src str,
    source_id: SourceId,
    tokens: Vec<Token>,
    pos: usize,
    pub(super) diagnostics: Diagnostics,
    depth: u32,
    last_diagnostic_pos: Option<TextSize>,
    exec_fuel_remaining: Option<u32>,
    recursion_fuel_limit: Option<u32>,
    fatal_error: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, source_id: SourceId, tokens: Vec<Token>) -> Self {
        Self {
            source,
            source_id,
            tokens: tokens.into_iter().filter(|t| !t.kind.is_trivia()).collect(),
            pos: 0,
            diagnostics: Diagnostics::new(),
            depth: 0,
            last_diagnostic_pos: None,
            exec_fuel_remaining: None,
            recursion_fuel_limit: None,
            fatal_error: None,
        }
    }

    pub fn with_exec_fuel(mut self, limit: Option<u32>) -> Self {
        self.exec_fuel_remaining = limit;
        self
    }

    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.recursion_fuel_limit = limit;
        self
    }

    /// Wrap up a parse: fatal errors win over the produced tree.
    pub(super) fn finish<T>(self, output: T) -> PassResult<T> {
        if let Some(err) = self.fatal_error {
            return Err(err);
        }
        Ok((output, self.diagnostics))
    }

    pub(super) fn has_fatal_error(&self) -> bool {
        self.fatal_error.is_some()
    }

    pub(super) fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    pub(super) fn nth(&self, lookahead: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + lookahead)
            .map_or(SyntaxKind::Eof, |t| t.kind)
    }

    pub(super) fn current_text(&self) -> &'src str {
        self.tokens
            .get(self.pos)
            .map_or("", |t| token_text(self.source, t))
    }

    fn consume_exec_fuel(&mut self) {
        if let Some(ref mut remaining) = self.exec_fuel_remaining {
            if *remaining == 0 {
                if self.fatal_error.is_none() {
                    self.fatal_error = Some(Error::ExecFuelExhausted);
                }
                return;
            }
            *remaining -= 1;
        }
    }

    pub(super) fn current_span(&self) -> TextRange {
        self.tokens
            .get(self.pos)
            .map_or_else(|| TextRange::empty(self.eof_offset()), |t| t.span)
    }

    pub(super) fn eof_offset(&self) -> TextSize {
        TextSize::from(self.source.len() as u32)
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(super) fn should_stop(&self) -> bool {
        self.eof() || self.has_fatal_error()
    }

    pub(super) fn currently_is(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(super) fn currently_is_one_of(&self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    /// Contextual keyword check: an identifier with the given text.
    pub(super) fn currently_is_word(&self, word: &str) -> bool {
        self.currently_is(SyntaxKind::Id) && self.current_text() == word
    }

    pub(super) fn bump(&mut self) -> Token {
        assert!(!self.eof(), "bump called at EOF");
        self.consume_exec_fuel();
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    pub(super) fn eat_token(&mut self, kind: SyntaxKind) -> bool {
        if self.currently_is(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// On mismatch: emit diagnostic but don't consume.
    pub(super) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        if self.eat_token(kind) {
            return true;
        }
        self.error_msg(DiagnosticKind::UnexpectedToken, format!("expected {}", what));
        false
    }

    /// Consume an identifier and return its text and range.
    pub(super) fn expect_name(&mut self, what: &str) -> Option<(String, TextRange)> {
        if self.currently_is(SyntaxKind::Id) {
            let token = self.bump();
            return Some((token_text(self.source, &token).to_owned(), token.span));
        }
        self.error_msg(DiagnosticKind::ExpectedName, format!("expected {}", what));
        None
    }

    /// Range from `start` to the end of the last consumed token.
    pub(super) fn range_from(&self, start: TextSize) -> TextRange {
        let end = self.tokens[..self.pos]
            .last()
            .map_or(start, |t| t.span.end())
            .max(start);
        TextRange::new(start, end)
    }

    pub(super) fn span(&self, range: TextRange) -> Option<Span> {
        Some(Span::new(self.source_id, range))
    }

    fn should_report(&mut self, pos: TextSize) -> bool {
        if self.last_diagnostic_pos == Some(pos) {
            return false;
        }
        self.last_diagnostic_pos = Some(pos);
        true
    }

    pub(super) fn error_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let range = self.current_span();
        self.error_at(kind, range, message);
    }

    pub(super) fn error_at(
        &mut self,
        kind: DiagnosticKind,
        range: TextRange,
        message: impl Into<String>,
    ) {
        if !self.should_report(range.start()) {
            return;
        }
        let span = self.span(range);
        self.diagnostics.report(kind, span).message(message).emit();
    }

    pub(super) fn error_and_bump(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.error_msg(kind, message);
        if !self.eof() {
            self.bump();
        }
    }

    /// Report at the current token, then skip until a token in `recovery`.
    pub(super) fn error_recover(
        &mut self,
        kind: DiagnosticKind,
        message: &str,
        recovery: TokenSet,
    ) {
        self.error_msg(kind, message);
        while !self.currently_is_one_of(recovery) && !self.should_stop() {
            self.bump();
        }
    }

    pub(super) fn enter_recursion(&mut self) -> bool {
        if let Some(limit) = self.recursion_fuel_limit
            && self.depth >= limit
        {
            if self.fatal_error.is_none() {
                self.fatal_error = Some(Error::RecursionLimitExceeded);
            }
            return false;
        }
        self.depth += 1;
        true
    }

    pub(super) fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Report a missing closing delimiter, pointing back at the opening one.
    pub(super) fn error_unclosed(
        &mut self,
        kind: DiagnosticKind,
        related_msg: &str,
        open_range: TextRange,
    ) {
        let current = self.current_span();
        if !self.should_report(current.start()) {
            return;
        }
        let full_range = TextRange::new(open_range.start(), current.end().max(open_range.end()));
        let span = self.span(full_range);
        let related = self.span(open_range);
        self.diagnostics
            .report(kind, span)
            .related_to(related_msg, related)
            .emit();
    }
}
