//! Assembling the parser-ready [`RuleSet`] of one grammar.

use indexmap::IndexSet;
use weft_core::{QualifiedName, RuleDef, RuleExpr, RuleSet, Terminal};

use crate::grammar::GrammarSet;
use crate::leaf::LeafRules;
use crate::normalize::{GraphItem, GraphItemId, RuleGraph};

/// Build the rule set of the grammar `graph` was normalized from.
///
/// Compressed leaf rules become a single pattern terminal and the pseudo-rules
/// written inside them are dropped. A leaf rule that failed to compress keeps
/// its structural right-hand side.
pub fn assemble_rule_set(grammars: &GrammarSet, graph: &RuleGraph, leaves: &LeafRules) -> RuleSet {
    let mut assembler = Assembler {
        grammars,
        graph,
        terminals: IndexSet::new(),
        embedded: IndexSet::new(),
    };

    let mut rules = Vec::with_capacity(graph.rules().len());
    for id in graph.rule_ids() {
        let rule = graph.rule(id);
        let owner = graph.declared_owner(id);
        if rule.is_pseudo() && leaves.get(owner).is_some() {
            continue;
        }

        let rhs = match leaves.get(id) {
            Some(leaf) => {
                let terminal = Terminal::pattern(&leaf.pattern);
                assembler.terminals.insert(terminal.clone());
                RuleExpr::Terminal(terminal)
            }
            None => assembler.expr(rule.rhs),
        };
        rules.push(RuleDef {
            name: rule.name.clone(),
            synthesized: rule.is_pseudo(),
            is_skip: rule.is_skip,
            is_leaf: rule.is_leaf,
            rhs,
        });
    }

    let rule_set = RuleSet {
        grammar: grammars.get(graph.grammar()).qualified_name(),
        rules,
        terminals: assembler.terminals.into_iter().collect(),
        embedded: assembler.embedded.into_iter().collect(),
    };
    tracing::debug!(
        grammar = %rule_set.grammar,
        rules = rule_set.rules.len(),
        terminals = rule_set.terminals.len(),
        "assembled rule set"
    );
    rule_set
}

struct Assembler<'a> {
    grammars: &'a GrammarSet,
    graph: &'a RuleGraph,
    terminals: IndexSet<Terminal>,
    embedded: IndexSet<QualifiedName>,
}

impl Assembler<'_> {
    fn expr(&mut self, id: GraphItemId) -> RuleExpr {
        match self.graph.item(id) {
            GraphItem::Terminal(terminal) => {
                self.terminals.insert(terminal.clone());
                RuleExpr::Terminal(terminal.clone())
            }
            GraphItem::NonTerminal { name, .. } => RuleExpr::NonTerminal(name.clone()),
            GraphItem::Concatenation(items) => {
                RuleExpr::Concatenation(items.iter().map(|&item| self.expr(item)).collect())
            }
            GraphItem::Choice { kind, alternatives } => RuleExpr::Choice {
                kind: *kind,
                alternatives: alternatives.iter().map(|&alt| self.expr(alt)).collect(),
            },
            GraphItem::Optional(item) => RuleExpr::Optional(Box::new(self.expr(*item))),
            GraphItem::List { min, max, item } => RuleExpr::List {
                min: *min,
                max: *max,
                item: Box::new(self.expr(*item)),
            },
            GraphItem::SeparatedList {
                min,
                max,
                item,
                separator,
            } => RuleExpr::SeparatedList {
                min: *min,
                max: *max,
                item: Box::new(self.expr(*item)),
                separator: Box::new(self.expr(*separator)),
            },
            GraphItem::Group(content) => RuleExpr::Group(Box::new(self.expr(*content))),
            GraphItem::Embedded {
                grammar,
                grammar_name,
                goal,
            } => {
                let grammar = grammar.map_or_else(
                    || grammar_name.clone(),
                    |id| self.grammars.get(id).qualified_name(),
                );
                self.embedded.insert(grammar.clone());
                RuleExpr::Embedded {
                    grammar,
                    goal: goal.clone(),
                }
            }
            GraphItem::Empty => RuleExpr::Empty,
        }
    }
}
