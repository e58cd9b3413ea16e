//! Transform-override text productions.
//!
//! ```text
//! file       := (directive | namespace | transform)*
//! namespace  := 'namespace' qname ';'?
//! transform  := 'transform' qname '{' (directive | rule)* '}'
//! rule       := Id ':' (Type '(' ')' '{' assignment* '}' | expr)
//! assignment := (Id | $Id) ':=' expr
//! expr       := primary ('as' qname)*
//! primary    := 'child' '[' Number ']' | 'children' ('.' 'items')?
//!             | 'with' '(' expr ')' expr | 'when' '{' branch* '}'
//!             | 'tuple' '{' assignment* '}' | '$self' | '$nothing' | '(' expr ')'
//! branch     := Number '==' '$alternative' '->' expr | 'else' '->' expr
//! ```
//!
//! Expression keywords are contextual: they are ordinary identifiers elsewhere.

use weft_core::{Assignment, Expr, WhenBranch};

use super::ast::{
    AssignmentDecl, DirectiveKind, Directives, RuleBody, TransformBlock, TransformFile,
    TransformRuleDecl, TransformScope,
};
use super::core::Parser;
use super::lexer::{SyntaxKind, TokenSet, token_text};
use crate::diagnostics::DiagnosticKind;

const BLOCK_RECOVERY: TokenSet = TokenSet::new(&[SyntaxKind::KwTransform, SyntaxKind::KwNamespace]);

const RULE_END: TokenSet = TokenSet::new(&[
    SyntaxKind::BraceClose,
    SyntaxKind::KwTransform,
    SyntaxKind::KwNamespace,
]);

impl Parser<'_> {
    pub(super) fn parse_transform_file(&mut self) -> TransformFile {
        let mut file = TransformFile::default();
        let mut scope: Option<TransformScope> = None;

        while !self.should_stop() {
            match self.current() {
                SyntaxKind::Directive => {
                    let target = match scope.as_mut() {
                        Some(scope) => &mut scope.directives,
                        None => &mut file.directives,
                    };
                    self.parse_directive(target);
                }
                SyntaxKind::KwNamespace => {
                    self.bump();
                    let namespace = self.parse_qualified_name("namespace name");
                    self.eat_token(SyntaxKind::Semicolon);
                    file.scopes.extend(scope.take());
                    scope = Some(TransformScope {
                        namespace: namespace.map(|n| n.name),
                        ..TransformScope::default()
                    });
                }
                SyntaxKind::KwTransform => {
                    if let Some(block) = self.parse_transform_block() {
                        scope.get_or_insert_with(TransformScope::default).blocks.push(block);
                    }
                }
                _ => {
                    self.error_and_bump(
                        DiagnosticKind::UnexpectedToken,
                        "expected `transform` or `namespace`",
                    );
                }
            }
        }

        file.scopes.extend(scope);
        file
    }

    fn parse_directive(&mut self, directives: &mut Directives) {
        let text = self.current_text();
        match DirectiveKind::from_text(text) {
            Some(kind) => {
                self.bump();
                directives.set(kind);
            }
            None => self.error_and_bump(DiagnosticKind::UnknownDirective, text),
        }
    }

    fn parse_transform_block(&mut self) -> Option<TransformBlock> {
        self.bump();
        let Some(grammar) = self.parse_qualified_name("grammar name") else {
            self.skip_until(BLOCK_RECOVERY);
            return None;
        };

        let mut block = TransformBlock {
            grammar: grammar.name.to_string(),
            grammar_range: grammar.range,
            directives: Directives::default(),
            rules: Vec::new(),
        };

        let open_range = self.current_span();
        if !self.expect(SyntaxKind::BraceOpen, "`{`") {
            self.skip_until(BLOCK_RECOVERY);
            return Some(block);
        }

        while !self.should_stop() && !self.currently_is_one_of(RULE_END) {
            match self.current() {
                SyntaxKind::Directive => self.parse_directive(&mut block.directives),
                SyntaxKind::Id if self.nth(1) == SyntaxKind::Colon => {
                    if let Some(rule) = self.parse_transform_rule() {
                        block.rules.push(rule);
                    } else {
                        self.recover_transform_rule();
                    }
                }
                _ => {
                    self.error_msg(DiagnosticKind::UnexpectedToken, "expected a transform rule");
                    self.bump();
                    self.recover_transform_rule();
                }
            }
        }

        if !self.eat_token(SyntaxKind::BraceClose) && !self.has_fatal_error() {
            self.error_unclosed(
                DiagnosticKind::UnclosedBlock,
                "transform block starts here",
                open_range,
            );
        }

        Some(block)
    }

    /// Skip to the next `name :` or the end of the block.
    fn recover_transform_rule(&mut self) {
        while !self.should_stop()
            && !self.currently_is_one_of(RULE_END)
            && !(self.currently_is(SyntaxKind::Id) && self.nth(1) == SyntaxKind::Colon)
        {
            self.bump();
        }
    }

    fn parse_transform_rule(&mut self) -> Option<TransformRuleDecl> {
        let token = self.bump();
        let rule = token_text(self.source, &token).to_owned();
        let rule_range = token.span;
        self.bump();

        let is_create = self.currently_is(SyntaxKind::Id)
            && self.nth(1) == SyntaxKind::ParenOpen
            && self.nth(2) == SyntaxKind::ParenClose;

        let body = if is_create {
            let token = self.bump();
            let type_name = token_text(self.source, &token).to_owned();
            self.bump();
            self.bump();
            let assignments = self.parse_assignment_block("object body starts here")?;
            RuleBody::Create {
                type_name,
                type_range: token.span,
                assignments: assignments
                    .into_iter()
                    .map(|(property, range, expr)| AssignmentDecl {
                        property,
                        range,
                        expr,
                    })
                    .collect(),
            }
        } else {
            let start = self.current_span().start();
            let expr = self.parse_expr()?;
            RuleBody::Expr {
                expr,
                range: self.range_from(start),
            }
        };

        Some(TransformRuleDecl {
            rule,
            rule_range,
            body,
        })
    }

    /// `{ prop := expr ... }`
    fn parse_assignment_block(
        &mut self,
        related_msg: &str,
    ) -> Option<Vec<(String, rowan::TextRange, Expr)>> {
        let open_range = self.current_span();
        if !self.expect(SyntaxKind::BraceOpen, "`{`") {
            return None;
        }

        let mut assignments = Vec::new();
        while !self.should_stop()
            && self.currently_is_one_of(TokenSet::new(&[SyntaxKind::Id, SyntaxKind::DollarId]))
            && self.nth(1) == SyntaxKind::ColonEquals
        {
            let token = self.bump();
            let property = token_text(self.source, &token).to_owned();
            self.bump();
            let expr = self.parse_expr()?;
            assignments.push((property, token.span, expr));
        }

        if !self.eat_token(SyntaxKind::BraceClose) {
            if self.has_fatal_error() {
                return None;
            }
            self.error_unclosed(DiagnosticKind::UnclosedBlock, related_msg, open_range);
            return None;
        }
        Some(assignments)
    }

    fn parse_expr(&mut self) -> Option<Expr> {
        if !self.enter_recursion() {
            return None;
        }
        let expr = self.parse_cast();
        self.exit_recursion();
        expr
    }

    fn parse_cast(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        while self.currently_is_word("as") {
            self.bump();
            let type_name = self.parse_qualified_name("type name")?;
            expr = Expr::cast(expr, type_name.name.to_string());
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let text = self.current_text();
        match self.current() {
            SyntaxKind::Id => match text {
                "child" => {
                    self.bump();
                    if !self.expect(SyntaxKind::BracketOpen, "`[`") {
                        return None;
                    }
                    if !self.currently_is(SyntaxKind::Number) {
                        self.error_msg(DiagnosticKind::UnexpectedToken, "expected a child index");
                        return None;
                    }
                    let index = self.parse_count();
                    self.expect(SyntaxKind::BracketClose, "`]`").then_some(Expr::ChildAt(index))
                }
                "children" => {
                    self.bump();
                    if self.currently_is(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Id {
                        self.bump();
                        if !self.currently_is_word("items") {
                            self.error_msg(DiagnosticKind::UnexpectedToken, "expected `items`");
                            return None;
                        }
                        self.bump();
                        return Some(Expr::ChildrenItems);
                    }
                    Some(Expr::Children)
                }
                "with" => {
                    self.bump();
                    if !self.expect(SyntaxKind::ParenOpen, "`(`") {
                        return None;
                    }
                    let inner = self.parse_expr()?;
                    if !self.expect(SyntaxKind::ParenClose, "`)`") {
                        return None;
                    }
                    let body = self.parse_expr()?;
                    Some(Expr::with(inner, body))
                }
                "when" => self.parse_when(),
                "tuple" => {
                    self.bump();
                    let fields = self.parse_assignment_block("tuple starts here")?;
                    Some(Expr::Tuple(
                        fields
                            .into_iter()
                            .map(|(property, _, expr)| Assignment::new(property, expr))
                            .collect(),
                    ))
                }
                _ => {
                    self.error_msg(
                        DiagnosticKind::ExpectedExpression,
                        format!("`{text}` is not an expression"),
                    );
                    None
                }
            },
            SyntaxKind::DollarId => match text {
                "$self" => {
                    self.bump();
                    Some(Expr::SelfRef)
                }
                "$nothing" => {
                    self.bump();
                    Some(Expr::Nothing)
                }
                _ => {
                    self.error_msg(
                        DiagnosticKind::ExpectedExpression,
                        format!("`{text}` is not an expression"),
                    );
                    None
                }
            },
            SyntaxKind::ParenOpen => {
                let open_range = self.current_span();
                self.bump();
                let expr = self.parse_expr()?;
                if !self.eat_token(SyntaxKind::ParenClose) {
                    self.error_unclosed(DiagnosticKind::UnclosedGroup, "group starts here", open_range);
                    return None;
                }
                Some(expr)
            }
            _ => {
                self.error_msg(DiagnosticKind::ExpectedExpression, "expected an expression");
                None
            }
        }
    }

    fn parse_when(&mut self) -> Option<Expr> {
        self.bump();
        let open_range = self.current_span();
        if !self.expect(SyntaxKind::BraceOpen, "`{`") {
            return None;
        }

        let mut branches = Vec::new();
        let mut otherwise = Expr::Nothing;
        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            if self.currently_is_word("else") {
                self.bump();
                if !self.expect(SyntaxKind::Arrow, "`->`") {
                    return None;
                }
                otherwise = self.parse_expr()?;
                continue;
            }

            if !self.currently_is(SyntaxKind::Number) {
                self.error_msg(
                    DiagnosticKind::UnexpectedToken,
                    "expected an alternative number or `else`",
                );
                return None;
            }
            let alternative = self.parse_count();
            if !self.expect(SyntaxKind::EqualsEquals, "`==`") {
                return None;
            }
            if !(self.currently_is(SyntaxKind::DollarId) && self.current_text() == "$alternative") {
                self.error_msg(DiagnosticKind::UnexpectedToken, "expected `$alternative`");
                return None;
            }
            self.bump();
            if !self.expect(SyntaxKind::Arrow, "`->`") {
                return None;
            }
            let expr = self.parse_expr()?;
            branches.push(WhenBranch { alternative, expr });
        }

        if !self.eat_token(SyntaxKind::BraceClose) {
            if !self.has_fatal_error() {
                self.error_unclosed(DiagnosticKind::UnclosedBlock, "`when` starts here", open_range);
            }
            return None;
        }

        Some(Expr::When {
            branches,
            otherwise: Box::new(otherwise),
        })
    }
}
