//! Normalized rule set handed to a parser.
//!
//! Every anonymous construct has already been lifted into a synthesized rule,
//! and leaf rules have been collapsed into a single pattern terminal.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::QualifiedName;

/// How a parser disambiguates between matching alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChoiceKind {
    /// Longest match wins (`|`).
    #[default]
    Longest,
    /// First alternative in declaration order wins (`<`).
    Priority,
    /// All matches are kept for the parser to resolve (`||`).
    Ambiguous,
}

impl ChoiceKind {
    pub fn operator(self) -> &'static str {
        match self {
            ChoiceKind::Longest => "|",
            ChoiceKind::Priority => "<",
            ChoiceKind::Ambiguous => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terminal {
    pub value: String,
    pub is_pattern: bool,
}

impl Terminal {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_pattern: false,
        }
    }

    pub fn pattern(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            is_pattern: true,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quote = if self.is_pattern { '"' } else { '\'' };
        f.write_char(quote)?;
        let mut chars = self.value.chars().peekable();
        while let Some(c) = chars.next() {
            // a backslash only needs escaping where it would otherwise be read as one
            let escape = c == quote
                || (c == '\\' && chars.peek().is_none_or(|&n| n == quote || n == '\\'));
            if escape {
                f.write_char('\\')?;
            }
            f.write_char(c)?;
        }
        f.write_char(quote)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleExpr {
    Terminal(Terminal),
    NonTerminal(String),
    Concatenation(Vec<RuleExpr>),
    Choice {
        kind: ChoiceKind,
        alternatives: Vec<RuleExpr>,
    },
    Optional(Box<RuleExpr>),
    List {
        min: u32,
        max: Option<u32>,
        item: Box<RuleExpr>,
    },
    SeparatedList {
        min: u32,
        max: Option<u32>,
        item: Box<RuleExpr>,
        separator: Box<RuleExpr>,
    },
    Group(Box<RuleExpr>),
    Embedded {
        grammar: QualifiedName,
        goal: String,
    },
    Empty,
}

impl RuleExpr {
    fn is_choice(&self) -> bool {
        matches!(self, RuleExpr::Choice { .. })
    }

    fn is_compound(&self) -> bool {
        matches!(self, RuleExpr::Choice { .. } | RuleExpr::Concatenation(_))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compound() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

fn fmt_quantifier(f: &mut fmt::Formatter<'_>, min: u32, max: Option<u32>) -> fmt::Result {
    match (min, max) {
        (0, None) => f.write_str("*"),
        (1, None) => f.write_str("+"),
        (n, None) => write!(f, "{{{n},}}"),
        (n, Some(m)) if n == m => write!(f, "{{{n}}}"),
        (n, Some(m)) => write!(f, "{{{n},{m}}}"),
    }
}

impl fmt::Display for RuleExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleExpr::Terminal(t) => write!(f, "{t}"),
            RuleExpr::NonTerminal(name) => f.write_str(name),
            RuleExpr::Concatenation(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    if item.is_choice() {
                        write!(f, "({item})")?;
                    } else {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            RuleExpr::Choice { kind, alternatives } => {
                for (i, alt) in alternatives.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", kind.operator())?;
                    }
                    if alt.is_choice() {
                        write!(f, "({alt})")?;
                    } else {
                        write!(f, "{alt}")?;
                    }
                }
                Ok(())
            }
            RuleExpr::Optional(item) => {
                item.fmt_operand(f)?;
                f.write_char('?')
            }
            RuleExpr::List { min, max, item } => {
                item.fmt_operand(f)?;
                fmt_quantifier(f, *min, *max)
            }
            RuleExpr::SeparatedList {
                min,
                max,
                item,
                separator,
            } => {
                write!(f, "[{item} / {separator}]")?;
                fmt_quantifier(f, *min, *max)
            }
            RuleExpr::Group(content) => write!(f, "({content})"),
            RuleExpr::Embedded { grammar, goal } => write!(f, "{grammar}::{goal}"),
            RuleExpr::Empty => f.write_str("<empty>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    /// Synthesized for an anonymous construct rather than declared.
    pub synthesized: bool,
    pub is_skip: bool,
    pub is_leaf: bool,
    pub rhs: RuleExpr,
}

impl fmt::Display for RuleDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_skip {
            f.write_str("skip ")?;
        }
        if self.is_leaf {
            f.write_str("leaf ")?;
        }
        write!(f, "{} = {} ;", self.name, self.rhs)
    }
}

/// Parser-ready rules of one grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub grammar: QualifiedName,
    /// Declared rules in resolved order, followed by synthesized rules.
    pub rules: Vec<RuleDef>,
    /// Compressed leaf patterns and inline terminals, first occurrence wins.
    pub terminals: Vec<Terminal>,
    /// Grammars referenced through embedded items.
    pub embedded: Vec<QualifiedName>,
}

impl RuleSet {
    /// Declared rules after extension and override resolution.
    pub fn all_resolved_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.iter().filter(|r| !r.synthesized)
    }

    /// Rules synthesized for anonymous constructs.
    pub fn pseudo_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.iter().filter(|r| r.synthesized)
    }

    pub fn skip_rules(&self) -> impl Iterator<Item = &RuleDef> {
        self.rules.iter().filter(|r| r.is_skip)
    }

    pub fn all_resolved_terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// Find a declared or synthesized rule by name.
    pub fn find_non_terminal_rule(&self, name: &str) -> Option<&RuleDef> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Find a terminal by its literal text or pattern source.
    pub fn find_terminal_rule(&self, pattern: &str) -> Option<&Terminal> {
        self.terminals.iter().find(|t| t.value == pattern)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "grammar {}", self.grammar)?;
        for rule in &self.rules {
            writeln!(f, "  {rule}")?;
        }
        if !self.embedded.is_empty() {
            writeln!(f, "embedded")?;
            for grammar in &self.embedded {
                writeln!(f, "  {grammar}")?;
            }
        }
        writeln!(f, "terminals")?;
        for terminal in &self.terminals {
            writeln!(f, "  {terminal}")?;
        }
        Ok(())
    }
}
