use weft_core::QualifiedName;

use super::model::{
    Grammar, GrammarRef, GrammarRule, ItemId, ItemNode, RuleIndex, RuleItem, RuleVariant,
};
use crate::diagnostics::Span;
use crate::{Error, Result};

/// Incremental construction of a [`Grammar`].
///
/// Items are allocated first and wired to their rule with [`set_rhs`](Self::set_rhs);
/// every rule must receive exactly one right-hand side before [`finish`](Self::finish).
#[derive(Debug)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    pub fn new(namespace: QualifiedName, name: impl Into<String>) -> Self {
        Self {
            grammar: Grammar {
                namespace,
                name: name.into(),
                span: None,
                extends: Vec::new(),
                rules: Vec::new(),
                items: Vec::new(),
            },
        }
    }

    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.grammar.span = span;
        self
    }

    pub fn extends(&mut self, name: QualifiedName, span: Option<Span>) {
        self.grammar.extends.push(GrammarRef::new(name, span));
    }

    pub fn add_rule(
        &mut self,
        name: impl Into<String>,
        is_skip: bool,
        is_leaf: bool,
        variant: RuleVariant,
        span: Option<Span>,
    ) -> RuleIndex {
        let index = RuleIndex(self.grammar.rules.len() as u32);
        self.grammar.rules.push(GrammarRule {
            name: name.into(),
            is_skip,
            is_leaf,
            variant,
            span,
            rhs: None,
        });
        index
    }

    pub fn item(&mut self, owner: RuleIndex, item: RuleItem, span: Option<Span>) -> ItemId {
        let id = ItemId(self.grammar.items.len() as u32);
        self.grammar.items.push(ItemNode { item, owner, span });
        id
    }

    pub fn set_rhs(&mut self, rule: RuleIndex, rhs: ItemId) -> Result<()> {
        let rule = &mut self.grammar.rules[rule.index()];
        if rule.rhs.is_some() {
            return Err(Error::RhsAlreadySet(rule.name.clone()));
        }
        rule.rhs = Some(rhs);
        Ok(())
    }

    pub fn finish(self) -> Result<Grammar> {
        for rule in &self.grammar.rules {
            rule.rhs()?;
        }
        Ok(self.grammar)
    }
}
