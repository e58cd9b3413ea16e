//! Grammar text productions.
//!
//! ```text
//! file      := (namespace | grammar)*
//! namespace := 'namespace' qname ';'?
//! grammar   := 'grammar' Id (':' qname (',' qname)*)? '{' rule* '}'
//! rule      := ('override' | 'skip' | 'leaf')* Id ('=' | '+=|') choice ';'
//! choice    := seq (op seq)*          op is one of `|`, `<`, `||`
//! seq       := postfix*
//! postfix   := atom quantifier*
//! atom      := Literal | Pattern | qname ('::' Id)? | '(' choice ')'
//!            | '[' choice '/' choice ']' quantifier | '<empty>'
//! ```

use rowan::TextRange;
use weft_core::{ChoiceKind, QualifiedName};

use super::ast::{GrammarDecl, GrammarFile, Item, ItemKind, NameRef, RuleDecl};
use super::core::Parser;
use super::lexer::{SyntaxKind, TokenSet, token_text, unquote};
use crate::diagnostics::DiagnosticKind;
use crate::grammar::OverrideKind;

const TOP_LEVEL_RECOVERY: TokenSet = TokenSet::new(&[SyntaxKind::KwGrammar, SyntaxKind::KwNamespace]);

const RULE_RECOVERY: TokenSet = TokenSet::new(&[
    SyntaxKind::Semicolon,
    SyntaxKind::BraceClose,
    SyntaxKind::KwGrammar,
    SyntaxKind::KwNamespace,
]);

const RULE_END: TokenSet = TokenSet::new(&[
    SyntaxKind::BraceClose,
    SyntaxKind::KwGrammar,
    SyntaxKind::KwNamespace,
]);

const RULE_FIRST: TokenSet = TokenSet::new(&[
    SyntaxKind::Id,
    SyntaxKind::KwOverride,
    SyntaxKind::KwSkip,
    SyntaxKind::KwLeaf,
]);

const ITEM_FIRST: TokenSet = TokenSet::new(&[
    SyntaxKind::Literal,
    SyntaxKind::Pattern,
    SyntaxKind::Id,
    SyntaxKind::ParenOpen,
    SyntaxKind::BracketOpen,
    SyntaxKind::EmptyKw,
]);

const QUANTIFIER_FIRST: TokenSet = TokenSet::new(&[
    SyntaxKind::Question,
    SyntaxKind::Star,
    SyntaxKind::Plus,
]);

fn choice_kind(kind: SyntaxKind) -> Option<ChoiceKind> {
    match kind {
        SyntaxKind::Pipe => Some(ChoiceKind::Longest),
        SyntaxKind::Less => Some(ChoiceKind::Priority),
        SyntaxKind::PipePipe => Some(ChoiceKind::Ambiguous),
        _ => None,
    }
}

/// Parsed repetition bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantifier {
    Optional,
    Repeat { min: u32, max: Option<u32> },
}

impl Parser<'_> {
    pub(super) fn parse_grammar_file(&mut self) -> GrammarFile {
        let mut file = GrammarFile::default();
        let mut namespace = QualifiedName::default();

        while !self.should_stop() {
            match self.current() {
                SyntaxKind::KwNamespace => {
                    self.bump();
                    if let Some(name) = self.parse_qualified_name("namespace name") {
                        namespace = name.name;
                    }
                    self.eat_token(SyntaxKind::Semicolon);
                }
                SyntaxKind::KwGrammar => {
                    if let Some(grammar) = self.parse_grammar_decl(&namespace) {
                        file.grammars.push(grammar);
                    }
                }
                SyntaxKind::Directive => {
                    let text = self.current_text();
                    self.error_and_bump(DiagnosticKind::UnknownDirective, text);
                }
                _ => {
                    self.error_and_bump(
                        DiagnosticKind::UnexpectedToken,
                        "expected `grammar` or `namespace`",
                    );
                }
            }
        }

        file
    }

    fn parse_grammar_decl(&mut self, namespace: &QualifiedName) -> Option<GrammarDecl> {
        self.bump();
        let Some((name, name_range)) = self.expect_name("grammar name") else {
            self.skip_until(TOP_LEVEL_RECOVERY);
            return None;
        };

        let mut extends = Vec::new();
        if self.eat_token(SyntaxKind::Colon) {
            loop {
                if let Some(name) = self.parse_qualified_name("super grammar name") {
                    extends.push(name);
                }
                if !self.eat_token(SyntaxKind::Comma) {
                    break;
                }
            }
        }

        let mut decl = GrammarDecl {
            namespace: namespace.clone(),
            name,
            name_range,
            extends,
            rules: Vec::new(),
        };

        let open_range = self.current_span();
        if !self.expect(SyntaxKind::BraceOpen, "`{`") {
            self.skip_until(TOP_LEVEL_RECOVERY);
            return Some(decl);
        }

        while !self.should_stop() && !self.currently_is_one_of(RULE_END) {
            if self.currently_is(SyntaxKind::Directive) {
                let text = self.current_text();
                self.error_and_bump(DiagnosticKind::UnknownDirective, text);
                continue;
            }
            if !self.currently_is_one_of(RULE_FIRST) {
                self.error_recover(DiagnosticKind::UnexpectedToken, "expected a rule", RULE_RECOVERY);
                self.eat_token(SyntaxKind::Semicolon);
                continue;
            }
            if let Some(rule) = self.parse_rule() {
                decl.rules.push(rule);
            }
        }

        if !self.eat_token(SyntaxKind::BraceClose) && !self.has_fatal_error() {
            self.error_unclosed(DiagnosticKind::UnclosedBlock, "grammar body starts here", open_range);
        }

        Some(decl)
    }

    fn parse_rule(&mut self) -> Option<RuleDecl> {
        let mut is_skip = false;
        let mut is_leaf = false;
        let mut has_override = false;
        loop {
            match self.current() {
                SyntaxKind::KwSkip => is_skip = true,
                SyntaxKind::KwLeaf => is_leaf = true,
                SyntaxKind::KwOverride => has_override = true,
                _ => break,
            }
            self.bump();
        }

        let Some((name, name_range)) = self.expect_name("rule name") else {
            self.recover_rule();
            return None;
        };

        let overrides = match self.current() {
            SyntaxKind::Equals => {
                self.bump();
                has_override.then_some(OverrideKind::Replace)
            }
            SyntaxKind::AppendEquals => {
                self.bump();
                if !has_override {
                    let span = self.span(name_range);
                    self.diagnostics
                        .report(DiagnosticKind::MissingOverride, span)
                        .fix("mark the rule as an override", format!("override {name}"))
                        .emit();
                }
                Some(OverrideKind::AppendAlternative)
            }
            _ => {
                self.error_msg(DiagnosticKind::UnexpectedToken, "expected `=` or `+=|`");
                self.recover_rule();
                return None;
            }
        };

        let rhs = self.parse_choice();

        if !self.eat_token(SyntaxKind::Semicolon) {
            self.error_msg(DiagnosticKind::UnexpectedToken, "expected `;`");
            self.recover_rule();
        }

        Some(RuleDecl {
            name,
            name_range,
            is_skip,
            is_leaf,
            overrides,
            rhs,
        })
    }

    fn recover_rule(&mut self) {
        self.skip_until(RULE_RECOVERY);
        self.eat_token(SyntaxKind::Semicolon);
    }

    pub(super) fn skip_until(&mut self, set: TokenSet) {
        while !self.should_stop() && !self.currently_is_one_of(set) {
            self.bump();
        }
    }

    pub(super) fn parse_qualified_name(&mut self, what: &str) -> Option<NameRef> {
        let (first, first_range) = self.expect_name(what)?;
        let mut parts = vec![first];
        while self.currently_is(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Id {
            self.bump();
            let token = self.bump();
            parts.push(token_text(self.source, &token).to_owned());
        }
        Some(NameRef {
            name: QualifiedName::from_parts(parts),
            range: self.range_from(first_range.start()),
        })
    }

    fn parse_choice(&mut self) -> Item {
        let start = self.current_span().start();
        if !self.enter_recursion() {
            return Item {
                kind: ItemKind::Empty,
                range: TextRange::empty(start),
            };
        }

        let first = self.parse_sequence();
        let Some(kind) = choice_kind(self.current()) else {
            self.exit_recursion();
            return first;
        };

        let mut alternatives = vec![first];
        while let Some(op) = choice_kind(self.current()) {
            if self.should_stop() {
                break;
            }
            let op_range = self.current_span();
            self.bump();
            if op != kind {
                self.error_at(
                    DiagnosticKind::MixedChoiceOperators,
                    op_range,
                    format!("`{}` after `{}`", op.operator(), kind.operator()),
                );
            }
            alternatives.push(self.parse_sequence());
        }

        self.exit_recursion();
        Item {
            kind: ItemKind::Choice { kind, alternatives },
            range: self.range_from(start),
        }
    }

    fn parse_sequence(&mut self) -> Item {
        let start = self.current_span().start();
        let mut items = Vec::new();
        while !self.should_stop() && self.currently_is_one_of(ITEM_FIRST) {
            if let Some(item) = self.parse_postfix() {
                items.push(item);
            }
        }

        match items.len() {
            0 => Item {
                kind: ItemKind::Empty,
                range: TextRange::empty(start),
            },
            1 => items.remove(0),
            _ => Item {
                kind: ItemKind::Concatenation(items),
                range: self.range_from(start),
            },
        }
    }

    fn parse_postfix(&mut self) -> Option<Item> {
        let start = self.current_span().start();
        let mut item = self.parse_atom()?;
        while let Some(quantifier) = self.parse_quantifier() {
            item = apply_quantifier(item, quantifier, self.range_from(start));
        }
        Some(item)
    }

    fn parse_atom(&mut self) -> Option<Item> {
        let range = self.current_span();
        match self.current() {
            SyntaxKind::Literal | SyntaxKind::Pattern => {
                let token = self.bump();
                let value = unquote(token_text(self.source, &token));
                let kind = if token.kind == SyntaxKind::Literal {
                    ItemKind::Literal(value)
                } else {
                    ItemKind::Pattern(value)
                };
                Some(Item { kind, range })
            }
            SyntaxKind::EmptyKw => {
                self.bump();
                Some(Item {
                    kind: ItemKind::Empty,
                    range,
                })
            }
            SyntaxKind::Id => self.parse_reference(),
            SyntaxKind::ParenOpen => Some(self.parse_group()),
            SyntaxKind::BracketOpen => Some(self.parse_separated_list()),
            _ => {
                self.error_and_bump(DiagnosticKind::ExpectedItem, "expected a rule item");
                None
            }
        }
    }

    fn parse_reference(&mut self) -> Option<Item> {
        let name = self.parse_qualified_name("rule name")?;

        if self.eat_token(SyntaxKind::DoubleColon) {
            let (goal, _) = self.expect_name("goal rule name")?;
            let range = self.range_from(name.range.start());
            return Some(Item {
                kind: ItemKind::Embedded {
                    grammar: name,
                    goal,
                },
                range,
            });
        }

        if name.name.is_qualified() {
            self.error_at(
                DiagnosticKind::UnexpectedToken,
                name.range,
                "expected `::` after a qualified grammar name",
            );
        }

        Some(Item {
            kind: ItemKind::Reference(name.name.to_string()),
            range: name.range,
        })
    }

    fn parse_group(&mut self) -> Item {
        let open_range = self.current_span();
        self.bump();
        let inner = self.parse_choice();
        if !self.eat_token(SyntaxKind::ParenClose) && !self.has_fatal_error() {
            self.error_unclosed(DiagnosticKind::UnclosedGroup, "group starts here", open_range);
        }
        Item {
            kind: ItemKind::Group(Box::new(inner)),
            range: self.range_from(open_range.start()),
        }
    }

    fn parse_separated_list(&mut self) -> Item {
        let start = self.current_span().start();
        self.bump();
        let item = self.parse_choice();

        let separator = if self.expect(SyntaxKind::Slash, "`/` before the separator") {
            Some(self.parse_choice())
        } else {
            None
        };
        self.expect(SyntaxKind::BracketClose, "`]`");

        let (min, max) = match self.parse_quantifier() {
            Some(Quantifier::Optional) => (0, Some(1)),
            Some(Quantifier::Repeat { min, max }) => (min, max),
            None => {
                self.error_msg(
                    DiagnosticKind::InvalidQuantifier,
                    "separated list needs a quantifier",
                );
                (0, None)
            }
        };

        let kind = match separator {
            Some(separator) => ItemKind::SeparatedList {
                min,
                max,
                item: Box::new(item),
                separator: Box::new(separator),
            },
            None => ItemKind::List {
                min,
                max,
                item: Box::new(item),
            },
        };
        Item {
            kind,
            range: self.range_from(start),
        }
    }

    fn parse_quantifier(&mut self) -> Option<Quantifier> {
        if self.currently_is_one_of(QUANTIFIER_FIRST) {
            let token = self.bump();
            return Some(match token.kind {
                SyntaxKind::Question => Quantifier::Optional,
                SyntaxKind::Star => Quantifier::Repeat { min: 0, max: None },
                _ => Quantifier::Repeat { min: 1, max: None },
            });
        }

        if !(self.currently_is(SyntaxKind::BraceOpen) && self.nth(1) == SyntaxKind::Number) {
            return None;
        }
        let start = self.current_span().start();
        self.bump();
        let min = self.parse_count();
        let max = if self.eat_token(SyntaxKind::Comma) {
            if self.currently_is(SyntaxKind::Number) {
                Some(self.parse_count())
            } else {
                None
            }
        } else {
            Some(min)
        };
        self.expect(SyntaxKind::BraceClose, "`}` after the repetition count");

        let max = match max {
            Some(max) if max < min => {
                let range = self.range_from(start);
                self.error_at(
                    DiagnosticKind::InvalidQuantifier,
                    range,
                    format!("maximum {max} is less than minimum {min}"),
                );
                Some(min)
            }
            max => max,
        };
        Some(Quantifier::Repeat { min, max })
    }

    pub(super) fn parse_count(&mut self) -> u32 {
        let range = self.current_span();
        let token = self.bump();
        let text = token_text(self.source, &token);
        text.parse().unwrap_or_else(|_| {
            self.error_at(
                DiagnosticKind::InvalidQuantifier,
                range,
                format!("`{text}` is out of range"),
            );
            u32::MAX
        })
    }
}

fn apply_quantifier(item: Item, quantifier: Quantifier, range: TextRange) -> Item {
    let kind = match quantifier {
        Quantifier::Optional => ItemKind::Optional(Box::new(item)),
        Quantifier::Repeat { min, max } => ItemKind::List {
            min,
            max,
            item: Box::new(item),
        },
    };
    Item { kind, range }
}
