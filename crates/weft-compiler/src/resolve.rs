//! Extension and override resolution.
//!
//! Each grammar's extends chain is flattened depth-first into one ordered list
//! of resolved rules. Override rules replace an inherited rule or append
//! alternatives to an inherited `|` choice. Results are computed once per
//! grammar and cached.

use std::collections::HashSet;

use indexmap::IndexMap;
use weft_core::ChoiceKind;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::grammar::{
    GrammarId, GrammarRule, GrammarSet, ItemId, OverrideKind, RuleIndex, RuleItem, RuleRef,
};
use crate::Result;

/// Right-hand side of a resolved rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRhs {
    /// The declaring rule's own rhs.
    Item(ItemId),
    /// A `|` choice assembled by `+=|` overrides. Alternatives may come from
    /// different grammars of the chain.
    Merged(Vec<(GrammarId, ItemId)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRule {
    /// The rule that declared this entry last: the override, if any.
    pub rule: RuleRef,
    pub rhs: ResolvedRhs,
}

impl ResolvedRule {
    pub fn declaration<'g>(&self, grammars: &'g GrammarSet) -> &'g GrammarRule {
        grammars.get(self.rule.grammar).rule(self.rule.rule)
    }

    pub fn name<'g>(&self, grammars: &'g GrammarSet) -> &'g str {
        &self.declaration(grammars).name
    }
}

/// Resolved rule lists of every grammar in a [`GrammarSet`].
#[derive(Debug, Clone, Default)]
pub struct ResolvedGrammars {
    rules: IndexMap<GrammarId, Vec<ResolvedRule>>,
}

impl ResolvedGrammars {
    pub fn rules(&self, grammar: GrammarId) -> &[ResolvedRule] {
        self.rules.get(&grammar).map_or(&[], Vec::as_slice)
    }

    pub fn find(
        &self,
        grammars: &GrammarSet,
        grammar: GrammarId,
        name: &str,
    ) -> Option<&ResolvedRule> {
        self.rules(grammar)
            .iter()
            .find(|r| r.name(grammars) == name)
    }
}

pub struct Resolver<'g> {
    grammars: &'g GrammarSet,
    diagnostics: Diagnostics,
    resolved: ResolvedGrammars,
    in_progress: HashSet<GrammarId>,
}

impl<'g> Resolver<'g> {
    pub fn new(grammars: &'g GrammarSet) -> Self {
        Self {
            grammars,
            diagnostics: Diagnostics::new(),
            resolved: ResolvedGrammars::default(),
            in_progress: HashSet::new(),
        }
    }

    /// Resolve every registered grammar.
    pub fn resolve_all(mut self) -> Result<(ResolvedGrammars, Diagnostics)> {
        for id in self.grammars.ids() {
            self.resolve(id)?;
        }
        tracing::debug!(grammars = self.resolved.rules.len(), "resolved extends chains");
        Ok((self.resolved, self.diagnostics))
    }

    fn resolve(&mut self, id: GrammarId) -> Result<Vec<ResolvedRule>> {
        if let Some(rules) = self.resolved.rules.get(&id) {
            return Ok(rules.clone());
        }
        self.in_progress.insert(id);

        let grammar = self.grammars.get(id);
        let mut list: Vec<ResolvedRule> = Vec::new();

        for reference in &grammar.extends {
            let Some(target) = reference.target else {
                continue;
            };
            if self.in_progress.contains(&target) {
                self.diagnostics
                    .report(DiagnosticKind::ExtendsCycle, reference.span)
                    .message(self.grammars.get(target).qualified_name().to_string())
                    .emit();
                continue;
            }
            for rule in self.resolve(target)? {
                if !list.contains(&rule) {
                    list.push(rule);
                }
            }
        }

        for index in grammar.rule_indices() {
            self.apply_rule(id, index, &mut list)?;
        }

        self.remove_duplicates(&mut list);

        tracing::trace!(grammar = %grammar.qualified_name(), rules = list.len(), "resolved grammar");
        self.in_progress.remove(&id);
        self.resolved.rules.insert(id, list.clone());
        Ok(list)
    }

    fn apply_rule(
        &mut self,
        grammar_id: GrammarId,
        index: RuleIndex,
        list: &mut Vec<ResolvedRule>,
    ) -> Result<()> {
        let grammar = self.grammars.get(grammar_id);
        let rule = grammar.rule(index);
        let rhs = rule.rhs()?;
        let this = RuleRef {
            grammar: grammar_id,
            rule: index,
        };

        let Some(kind) = rule.override_kind() else {
            list.push(ResolvedRule {
                rule: this,
                rhs: ResolvedRhs::Item(rhs),
            });
            return Ok(());
        };

        let matches: Vec<usize> = list
            .iter()
            .enumerate()
            .filter(|(_, r)| r.name(self.grammars) == rule.name)
            .map(|(i, _)| i)
            .collect();

        if matches.is_empty() {
            self.diagnostics
                .report(DiagnosticKind::NoSuperRule, rule.span)
                .message(&rule.name)
                .emit();
            return Ok(());
        }

        match kind {
            OverrideKind::Replace => {
                list.retain(|r| r.name(self.grammars) != rule.name);
                list.push(ResolvedRule {
                    rule: this,
                    rhs: ResolvedRhs::Item(rhs),
                });
            }
            OverrideKind::AppendAlternative => {
                if matches.len() > 1 {
                    self.diagnostics
                        .report(DiagnosticKind::AmbiguousRule, rule.span)
                        .message(&rule.name)
                        .emit();
                    return Ok(());
                }

                let base = &list[matches[0]];
                let Some(mut alternatives) = self.longest_alternatives(base) else {
                    let related = base.declaration(self.grammars).span;
                    self.diagnostics
                        .report(DiagnosticKind::AppendToNonLongestChoice, rule.span)
                        .related_to("super rule defined here", related)
                        .emit();
                    return Ok(());
                };

                match grammar.item(rhs) {
                    RuleItem::Choice {
                        kind: ChoiceKind::Longest,
                        alternatives: own,
                    } => alternatives.extend(own.iter().map(|&alt| (grammar_id, alt))),
                    _ => alternatives.push((grammar_id, rhs)),
                }

                list.remove(matches[0]);
                list.push(ResolvedRule {
                    rule: this,
                    rhs: ResolvedRhs::Merged(alternatives),
                });
            }
        }
        Ok(())
    }

    /// Alternatives of a `|` choice rhs, or `None` for any other rhs.
    fn longest_alternatives(&self, base: &ResolvedRule) -> Option<Vec<(GrammarId, ItemId)>> {
        match &base.rhs {
            ResolvedRhs::Merged(alternatives) => Some(alternatives.clone()),
            ResolvedRhs::Item(item) => {
                let grammar = base.rule.grammar;
                match self.grammars.get(grammar).item(*item) {
                    RuleItem::Choice {
                        kind: ChoiceKind::Longest,
                        alternatives,
                    } => Some(alternatives.iter().map(|&alt| (grammar, alt)).collect()),
                    _ => None,
                }
            }
        }
    }

    /// First entry of each name wins.
    fn remove_duplicates(&mut self, list: &mut Vec<ResolvedRule>) {
        let mut seen: IndexMap<&str, usize> = IndexMap::new();
        let mut keep = Vec::with_capacity(list.len());
        for (i, rule) in list.iter().enumerate() {
            let name = rule.name(self.grammars);
            if let Some(&first) = seen.get(name) {
                let first = list[first].declaration(self.grammars).span;
                self.diagnostics
                    .report(
                        DiagnosticKind::DuplicateRule,
                        rule.declaration(self.grammars).span,
                    )
                    .message(name)
                    .related_to("first defined here", first)
                    .emit();
                keep.push(false);
            } else {
                seen.insert(name, i);
                keep.push(true);
            }
        }
        let mut keep = keep.into_iter();
        list.retain(|_| keep.next().unwrap_or(true));
    }
}
