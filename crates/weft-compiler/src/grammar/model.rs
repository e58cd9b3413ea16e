//! Raw grammar model: grammars, rules and arena-allocated rule items.

use weft_core::{ChoiceKind, QualifiedName, Terminal};

use crate::diagnostics::Span;
use crate::{Error, Result};

/// Index of a grammar in a [`GrammarSet`](super::GrammarSet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GrammarId(pub(crate) u32);

impl GrammarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a rule within its grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleIndex(pub(crate) u32);

impl RuleIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of an item in its grammar's item arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32);

impl ItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A rule identified across grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleRef {
    pub grammar: GrammarId,
    pub rule: RuleIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideKind {
    /// `override name = ...`
    Replace,
    /// `override name +=| ...`
    AppendAlternative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleVariant {
    #[default]
    Normal,
    Override(OverrideKind),
}

/// Reference to another grammar by name, resolved by [`GrammarSet::link`](super::GrammarSet::link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRef {
    pub name: QualifiedName,
    pub span: Option<Span>,
    pub target: Option<GrammarId>,
}

impl GrammarRef {
    pub fn new(name: QualifiedName, span: Option<Span>) -> Self {
        Self {
            name,
            span,
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleItem {
    Terminal(Terminal),
    NonTerminal(String),
    Concatenation(Vec<ItemId>),
    Choice {
        kind: ChoiceKind,
        alternatives: Vec<ItemId>,
    },
    Optional(ItemId),
    List {
        min: u32,
        max: Option<u32>,
        item: ItemId,
    },
    SeparatedList {
        min: u32,
        max: Option<u32>,
        item: ItemId,
        separator: ItemId,
    },
    Group(ItemId),
    Embedded {
        grammar: GrammarRef,
        goal: String,
    },
    Empty,
}

impl RuleItem {
    /// Structural children in order. A separated list yields item then separator.
    pub fn children(&self) -> Vec<ItemId> {
        match self {
            RuleItem::Concatenation(items) => items.clone(),
            RuleItem::Choice { alternatives, .. } => alternatives.clone(),
            RuleItem::Optional(item) | RuleItem::Group(item) | RuleItem::List { item, .. } => {
                vec![*item]
            }
            RuleItem::SeparatedList {
                item, separator, ..
            } => vec![*item, *separator],
            RuleItem::Terminal(_)
            | RuleItem::NonTerminal(_)
            | RuleItem::Embedded { .. }
            | RuleItem::Empty => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemNode {
    pub item: RuleItem,
    pub owner: RuleIndex,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRule {
    pub name: String,
    pub is_skip: bool,
    pub is_leaf: bool,
    pub variant: RuleVariant,
    pub span: Option<Span>,
    pub(crate) rhs: Option<ItemId>,
}

impl GrammarRule {
    pub fn rhs(&self) -> Result<ItemId> {
        self.rhs.ok_or_else(|| Error::RhsNotSet(self.name.clone()))
    }

    pub fn override_kind(&self) -> Option<OverrideKind> {
        match self.variant {
            RuleVariant::Normal => None,
            RuleVariant::Override(kind) => Some(kind),
        }
    }
}

/// A grammar as declared, before extends and overrides are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub namespace: QualifiedName,
    pub name: String,
    pub span: Option<Span>,
    pub extends: Vec<GrammarRef>,
    pub(crate) rules: Vec<GrammarRule>,
    pub(crate) items: Vec<ItemNode>,
}

impl Grammar {
    pub fn qualified_name(&self) -> QualifiedName {
        self.namespace.child(&self.name)
    }

    pub fn rules(&self) -> &[GrammarRule] {
        &self.rules
    }

    pub fn rule(&self, index: RuleIndex) -> &GrammarRule {
        &self.rules[index.index()]
    }

    pub fn rule_indices(&self) -> impl Iterator<Item = RuleIndex> + use<> {
        (0..self.rules.len() as u32).map(RuleIndex)
    }

    pub fn find_rule(&self, name: &str) -> Option<RuleIndex> {
        self.rules
            .iter()
            .position(|r| r.name == name)
            .map(|i| RuleIndex(i as u32))
    }

    pub fn node(&self, id: ItemId) -> &ItemNode {
        &self.items[id.index()]
    }

    pub fn item(&self, id: ItemId) -> &RuleItem {
        &self.node(id).item
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemNode> {
        self.items.iter()
    }

    /// The `index`-th structural child of an item.
    pub fn sub_item(&self, id: ItemId, index: usize) -> Result<ItemId> {
        self.item(id)
            .children()
            .get(index)
            .copied()
            .ok_or_else(|| Error::InvalidSubItem {
                rule: self.rule(self.node(id).owner).name.clone(),
                index,
            })
    }
}
