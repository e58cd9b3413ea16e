//! Syntax trees for grammar and transform-override text.
//!
//! Nodes keep the ranges of the text they were parsed from so later passes can
//! point diagnostics at the source.

use rowan::TextRange;
use weft_core::{ChoiceKind, Expr, QualifiedName};

use crate::grammar::OverrideKind;

/// A parsed grammar source: any number of grammars, each under the namespace
/// declared last before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarFile {
    pub grammars: Vec<GrammarDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarDecl {
    pub namespace: QualifiedName,
    pub name: String,
    pub name_range: TextRange,
    pub extends: Vec<NameRef>,
    pub rules: Vec<RuleDecl>,
}

/// A possibly qualified name as written, with its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    pub name: QualifiedName,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDecl {
    pub name: String,
    pub name_range: TextRange,
    pub is_skip: bool,
    pub is_leaf: bool,
    pub overrides: Option<OverrideKind>,
    pub rhs: Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Literal(String),
    Pattern(String),
    Reference(String),
    Embedded {
        grammar: NameRef,
        goal: String,
    },
    Concatenation(Vec<Item>),
    Choice {
        kind: ChoiceKind,
        alternatives: Vec<Item>,
    },
    Optional(Box<Item>),
    List {
        min: u32,
        max: Option<u32>,
        item: Box<Item>,
    },
    SeparatedList {
        min: u32,
        max: Option<u32>,
        item: Box<Item>,
        separator: Box<Item>,
    },
    Group(Box<Item>),
    Empty,
}

/// Directives recognized in transform-override text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    CreateMissingTypes,
    OverrideDefaultTransform,
}

impl DirectiveKind {
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "#create-missing-types" => Some(Self::CreateMissingTypes),
            "#override-default-transform" => Some(Self::OverrideDefaultTransform),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub create_missing_types: bool,
    pub override_default_transform: bool,
}

impl Directives {
    pub fn set(&mut self, kind: DirectiveKind) {
        match kind {
            DirectiveKind::CreateMissingTypes => self.create_missing_types = true,
            DirectiveKind::OverrideDefaultTransform => self.override_default_transform = true,
        }
    }

    /// Directives in effect in a nested scope.
    pub fn combine(&self, inner: &Directives) -> Directives {
        Directives {
            create_missing_types: self.create_missing_types || inner.create_missing_types,
            override_default_transform: self.override_default_transform
                || inner.override_default_transform,
        }
    }
}

/// A parsed transform-override source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformFile {
    /// Directives before the first `namespace`, applying to the whole file.
    pub directives: Directives,
    pub scopes: Vec<TransformScope>,
}

/// Transform blocks sharing a namespace header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformScope {
    pub namespace: Option<QualifiedName>,
    pub directives: Directives,
    pub blocks: Vec<TransformBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformBlock {
    pub grammar: String,
    pub grammar_range: TextRange,
    pub directives: Directives,
    pub rules: Vec<TransformRuleDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRuleDecl {
    pub rule: String,
    pub rule_range: TextRange,
    pub body: RuleBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleBody {
    /// `Type() { prop := expr ... }`
    Create {
        type_name: String,
        type_range: TextRange,
        assignments: Vec<AssignmentDecl>,
    },
    /// Any other expression, possibly cast to a type.
    Expr { expr: Expr, range: TextRange },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDecl {
    pub property: String,
    pub range: TextRange,
    pub expr: Expr,
}
