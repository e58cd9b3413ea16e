//! Lowering of parsed grammar declarations into the grammar model.

use weft_core::Terminal;

use super::builder::GrammarBuilder;
use super::model::{Grammar, GrammarRef, ItemId, RuleIndex, RuleItem, RuleVariant};
use crate::diagnostics::Span;
use crate::parser::ast::{GrammarDecl, Item, ItemKind};
use crate::{Result, SourceId};

pub fn lower_grammar(decl: &GrammarDecl, source: SourceId) -> Result<Grammar> {
    let mut lower = Lower {
        builder: GrammarBuilder::new(decl.namespace.clone(), &decl.name)
            .with_span(Some(Span::new(source, decl.name_range))),
        source,
    };

    for extends in &decl.extends {
        lower
            .builder
            .extends(extends.name.clone(), Some(Span::new(source, extends.range)));
    }

    for rule in &decl.rules {
        let variant = rule
            .overrides
            .map_or(RuleVariant::Normal, RuleVariant::Override);
        let index = lower.builder.add_rule(
            &rule.name,
            rule.is_skip,
            rule.is_leaf,
            variant,
            Some(Span::new(source, rule.name_range)),
        );
        let rhs = lower.item(index, &rule.rhs);
        lower.builder.set_rhs(index, rhs)?;
    }

    lower.builder.finish()
}

struct Lower {
    builder: GrammarBuilder,
    source: SourceId,
}

impl Lower {
    fn item(&mut self, owner: RuleIndex, item: &Item) -> ItemId {
        let rule_item = match &item.kind {
            ItemKind::Literal(value) => RuleItem::Terminal(Terminal::literal(value)),
            ItemKind::Pattern(value) => RuleItem::Terminal(Terminal::pattern(value)),
            ItemKind::Reference(name) => RuleItem::NonTerminal(name.clone()),
            ItemKind::Embedded { grammar, goal } => RuleItem::Embedded {
                grammar: GrammarRef::new(
                    grammar.name.clone(),
                    Some(Span::new(self.source, grammar.range)),
                ),
                goal: goal.clone(),
            },
            ItemKind::Concatenation(items) => {
                RuleItem::Concatenation(items.iter().map(|i| self.item(owner, i)).collect())
            }
            ItemKind::Choice { kind, alternatives } => RuleItem::Choice {
                kind: *kind,
                alternatives: alternatives.iter().map(|i| self.item(owner, i)).collect(),
            },
            ItemKind::Optional(inner) => RuleItem::Optional(self.item(owner, inner)),
            ItemKind::List { min, max, item } => RuleItem::List {
                min: *min,
                max: *max,
                item: self.item(owner, item),
            },
            ItemKind::SeparatedList {
                min,
                max,
                item,
                separator,
            } => RuleItem::SeparatedList {
                min: *min,
                max: *max,
                item: self.item(owner, item),
                separator: self.item(owner, separator),
            },
            ItemKind::Group(inner) => RuleItem::Group(self.item(owner, inner)),
            ItemKind::Empty => RuleItem::Empty,
        };
        self.builder
            .item(owner, rule_item, Some(Span::new(self.source, item.range)))
    }
}
