//! Rule normalization and pseudo-rule synthesis.
//!
//! A grammar's resolved rules are copied into a [`RuleGraph`]: every item gets
//! a structural [`IndexPath`], nonterminal references are bound to rule ids,
//! and every group, choice, list, optional or embedded reference that is not
//! the top-level rhs of its rule is lifted into a named pseudo-rule.

use indexmap::IndexMap;
use weft_core::{ChoiceKind, IndexPath, QualifiedName, Terminal, utils::PSEUDO_MARKER};

use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::grammar::{GrammarId, GrammarSet, ItemId, RuleItem, RuleRef};
use crate::resolve::{ResolvedGrammars, ResolvedRhs};
use crate::{PassResult, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphRuleId(u32);

impl GraphRuleId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphItemId(u32);

impl GraphItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoKind {
    Group,
    Choice,
    Multi,
    Opt,
    Embedded,
}

impl PseudoKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PseudoKind::Group => "group",
            PseudoKind::Choice => "choice",
            PseudoKind::Multi => "multi",
            PseudoKind::Opt => "opt",
            PseudoKind::Embedded => "embedded",
        }
    }

    fn of(item: &RuleItem) -> Option<Self> {
        match item {
            RuleItem::Group(_) => Some(PseudoKind::Group),
            RuleItem::Choice { .. } => Some(PseudoKind::Choice),
            RuleItem::List { .. } | RuleItem::SeparatedList { .. } => Some(PseudoKind::Multi),
            RuleItem::Optional(_) => Some(PseudoKind::Opt),
            RuleItem::Embedded { .. } => Some(PseudoKind::Embedded),
            RuleItem::Terminal(_)
            | RuleItem::NonTerminal(_)
            | RuleItem::Concatenation(_)
            | RuleItem::Empty => None,
        }
    }
}

/// `§S§opt1`
pub fn pseudo_rule_name(owner: &str, kind: PseudoKind, ordinal: u32) -> String {
    format!("{PSEUDO_MARKER}{owner}{PSEUDO_MARKER}{}{ordinal}", kind.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOrigin {
    Declared(RuleRef),
    Pseudo {
        /// The declared rule the construct was written in.
        owner: GraphRuleId,
        kind: PseudoKind,
        ordinal: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphRule {
    pub name: String,
    pub is_skip: bool,
    pub is_leaf: bool,
    pub origin: RuleOrigin,
    pub rhs: GraphItemId,
    pub span: Option<Span>,
}

impl GraphRule {
    pub fn is_pseudo(&self) -> bool {
        matches!(self.origin, RuleOrigin::Pseudo { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphItem {
    Terminal(Terminal),
    NonTerminal {
        name: String,
        target: Option<GraphRuleId>,
    },
    Concatenation(Vec<GraphItemId>),
    Choice {
        kind: ChoiceKind,
        alternatives: Vec<GraphItemId>,
    },
    Optional(GraphItemId),
    List {
        min: u32,
        max: Option<u32>,
        item: GraphItemId,
    },
    SeparatedList {
        min: u32,
        max: Option<u32>,
        item: GraphItemId,
        separator: GraphItemId,
    },
    Group(GraphItemId),
    Embedded {
        grammar: Option<GrammarId>,
        grammar_name: QualifiedName,
        goal: String,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub item: GraphItem,
    pub owner: GraphRuleId,
    /// Grammar the item was written in; differs from the graph's grammar for
    /// inherited rules.
    pub grammar: GrammarId,
    pub index: IndexPath,
    pub span: Option<Span>,
}

/// Normalized rules of one grammar.
#[derive(Debug, Clone)]
pub struct RuleGraph {
    grammar: GrammarId,
    rules: Vec<GraphRule>,
    nodes: Vec<GraphNode>,
    by_name: IndexMap<String, GraphRuleId>,
}

impl RuleGraph {
    pub fn grammar(&self) -> GrammarId {
        self.grammar
    }

    pub fn rules(&self) -> &[GraphRule] {
        &self.rules
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = GraphRuleId> + use<> {
        (0..self.rules.len() as u32).map(GraphRuleId)
    }

    pub fn rule(&self, id: GraphRuleId) -> &GraphRule {
        &self.rules[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<GraphRuleId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: GraphItemId) -> &GraphNode {
        &self.nodes[id.index()]
    }

    pub fn item(&self, id: GraphItemId) -> &GraphItem {
        &self.node(id).item
    }

    /// Declared rules in resolved order.
    pub fn declared(&self) -> impl Iterator<Item = GraphRuleId> + '_ {
        self.rule_ids().filter(|&id| !self.rule(id).is_pseudo())
    }

    /// The declared rule a rule was written in: itself unless pseudo.
    pub fn declared_owner(&self, id: GraphRuleId) -> GraphRuleId {
        match self.rule(id).origin {
            RuleOrigin::Declared(_) => id,
            RuleOrigin::Pseudo { owner, .. } => owner,
        }
    }

    /// Pseudo-rules written inside leaf or skip rules carry no value of their own.
    pub fn is_inside_token_rule(&self, id: GraphRuleId) -> bool {
        let owner = self.rule(self.declared_owner(id));
        self.rule(id).is_pseudo() && (owner.is_leaf || owner.is_skip)
    }

    /// Target rule of a nonterminal item.
    pub fn target(&self, id: GraphItemId) -> Option<GraphRuleId> {
        match self.item(id) {
            GraphItem::NonTerminal { target, .. } => *target,
            _ => None,
        }
    }
}

/// Build the rule graph of one grammar from its resolved rules.
pub fn normalize(
    grammars: &GrammarSet,
    resolved: &ResolvedGrammars,
    grammar: GrammarId,
) -> PassResult<RuleGraph> {
    let declared = resolved.rules(grammar);
    let mut normalizer = Normalizer {
        grammars,
        resolved,
        graph: RuleGraph {
            grammar,
            rules: Vec::new(),
            nodes: Vec::new(),
            by_name: IndexMap::new(),
        },
        pseudo: Vec::new(),
        declared_count: declared.len() as u32,
        counters: IndexMap::new(),
        diagnostics: Diagnostics::new(),
    };

    for (index, rule) in declared.iter().enumerate() {
        let id = GraphRuleId(index as u32);
        let declaration = rule.declaration(grammars);
        let rhs = match &rule.rhs {
            ResolvedRhs::Item(item) => {
                normalizer.convert(rule.rule.grammar, *item, IndexPath::root(), id, id, true)?
            }
            ResolvedRhs::Merged(alternatives) => normalizer.merged(alternatives, id, rule.rule)?,
        };
        normalizer.graph.rules.push(GraphRule {
            name: declaration.name.clone(),
            is_skip: declaration.is_skip,
            is_leaf: declaration.is_leaf,
            origin: RuleOrigin::Declared(rule.rule),
            rhs,
            span: declaration.span,
        });
    }

    let pseudo = std::mem::take(&mut normalizer.pseudo);
    normalizer.graph.rules.extend(pseudo);
    normalizer.bind_references();

    let Normalizer {
        graph, diagnostics, ..
    } = normalizer;
    tracing::debug!(
        rules = graph.rules.len(),
        pseudo = graph.rules.len() - graph.declared().count(),
        "normalized rule graph"
    );
    Ok((graph, diagnostics))
}

struct Normalizer<'a> {
    grammars: &'a GrammarSet,
    resolved: &'a ResolvedGrammars,
    graph: RuleGraph,
    pseudo: Vec<GraphRule>,
    declared_count: u32,
    counters: IndexMap<(GraphRuleId, PseudoKind), u32>,
    diagnostics: Diagnostics,
}

impl Normalizer<'_> {
    fn push(
        &mut self,
        item: GraphItem,
        owner: GraphRuleId,
        grammar: GrammarId,
        index: IndexPath,
        span: Option<Span>,
    ) -> GraphItemId {
        let id = GraphItemId(self.graph.nodes.len() as u32);
        self.graph.nodes.push(GraphNode {
            item,
            owner,
            grammar,
            index,
            span,
        });
        id
    }

    /// Top-level `|` choice assembled from `+=|` overrides.
    fn merged(
        &mut self,
        alternatives: &[(GrammarId, ItemId)],
        owner: GraphRuleId,
        rule: RuleRef,
    ) -> Result<GraphItemId> {
        let root = IndexPath::root();
        let mut items = Vec::with_capacity(alternatives.len());
        for (i, &(grammar, item)) in alternatives.iter().enumerate() {
            items.push(self.convert(grammar, item, root.child(i as u32), owner, owner, false)?);
        }
        let span = self.grammars.get(rule.grammar).rule(rule.rule).span;
        Ok(self.push(
            GraphItem::Choice {
                kind: ChoiceKind::Longest,
                alternatives: items,
            },
            owner,
            rule.grammar,
            root,
            span,
        ))
    }

    /// Copy `item` into the graph at `index`. `owner` is the rule the copy
    /// belongs to and `declared` the declared rule that names pseudo-rules.
    fn convert(
        &mut self,
        grammar: GrammarId,
        item: ItemId,
        index: IndexPath,
        owner: GraphRuleId,
        declared: GraphRuleId,
        top: bool,
    ) -> Result<GraphItemId> {
        let grammars = self.grammars;
        let node = grammars.get(grammar).node(item);
        let span = node.span;

        if !top && let Some(kind) = PseudoKind::of(&node.item) {
            let target = self.lift(grammar, item, declared, kind)?;
            let name = self.pseudo_rule(target).name.clone();
            return Ok(self.push(
                GraphItem::NonTerminal {
                    name,
                    target: Some(target),
                },
                owner,
                grammar,
                index,
                span,
            ));
        }

        let converted = match &node.item {
            RuleItem::Terminal(terminal) => GraphItem::Terminal(terminal.clone()),
            RuleItem::NonTerminal(name) => GraphItem::NonTerminal {
                name: name.clone(),
                target: None,
            },
            RuleItem::Concatenation(items) => {
                let mut children = Vec::with_capacity(items.len());
                for (i, &child) in items.iter().enumerate() {
                    children.push(self.convert(
                        grammar,
                        child,
                        index.child(i as u32),
                        owner,
                        declared,
                        false,
                    )?);
                }
                GraphItem::Concatenation(children)
            }
            RuleItem::Choice { kind, alternatives } => {
                let mut children = Vec::with_capacity(alternatives.len());
                for (i, &child) in alternatives.iter().enumerate() {
                    children.push(self.convert(
                        grammar,
                        child,
                        index.child(i as u32),
                        owner,
                        declared,
                        false,
                    )?);
                }
                GraphItem::Choice {
                    kind: *kind,
                    alternatives: children,
                }
            }
            RuleItem::Optional(child) => GraphItem::Optional(self.convert(
                grammar,
                *child,
                index.child(0),
                owner,
                declared,
                false,
            )?),
            RuleItem::Group(child) => GraphItem::Group(self.convert(
                grammar,
                *child,
                index.child(0),
                owner,
                declared,
                false,
            )?),
            RuleItem::List { min, max, item } => GraphItem::List {
                min: *min,
                max: *max,
                item: self.convert(grammar, *item, index.child(0), owner, declared, false)?,
            },
            // The separator shares the item's path.
            RuleItem::SeparatedList {
                min,
                max,
                item,
                separator,
            } => GraphItem::SeparatedList {
                min: *min,
                max: *max,
                item: self.convert(grammar, *item, index.child(0), owner, declared, false)?,
                separator: self.convert(
                    grammar,
                    *separator,
                    index.child(0),
                    owner,
                    declared,
                    false,
                )?,
            },
            RuleItem::Embedded {
                grammar: reference,
                goal,
            } => GraphItem::Embedded {
                grammar: reference.target,
                grammar_name: reference.name.clone(),
                goal: goal.clone(),
            },
            RuleItem::Empty => GraphItem::Empty,
        };

        Ok(self.push(converted, owner, grammar, index, span))
    }

    /// Synthesize a pseudo-rule whose rhs is the construct at `item`.
    fn lift(
        &mut self,
        grammar: GrammarId,
        item: ItemId,
        declared: GraphRuleId,
        kind: PseudoKind,
    ) -> Result<GraphRuleId> {
        let counter = self.counters.entry((declared, kind)).or_insert(0);
        *counter += 1;
        let ordinal = *counter;

        let id = GraphRuleId(self.declared_count + self.pseudo.len() as u32);
        let owner_name = self.declared_name(declared);
        let name = pseudo_rule_name(&owner_name, kind, ordinal);
        tracing::trace!(rule = %name, "synthesized pseudo-rule");

        let grammars = self.grammars;
        let span = grammars.get(grammar).node(item).span;
        self.pseudo.push(GraphRule {
            name,
            is_skip: false,
            is_leaf: false,
            origin: RuleOrigin::Pseudo {
                owner: declared,
                kind,
                ordinal,
            },
            // Patched below once the construct is converted.
            rhs: GraphItemId(u32::MAX),
            span,
        });

        let rhs = self.convert(grammar, item, IndexPath::root(), id, declared, true)?;
        self.pseudo_rule_mut(id).rhs = rhs;
        Ok(id)
    }

    fn declared_name(&self, declared: GraphRuleId) -> String {
        let rule = &self.resolved.rules(self.graph.grammar)[declared.index()];
        rule.name(self.grammars).to_owned()
    }

    fn pseudo_rule(&self, id: GraphRuleId) -> &GraphRule {
        &self.pseudo[(id.0 - self.declared_count) as usize]
    }

    fn pseudo_rule_mut(&mut self, id: GraphRuleId) -> &mut GraphRule {
        &mut self.pseudo[(id.0 - self.declared_count) as usize]
    }

    fn bind_references(&mut self) {
        for (i, rule) in self.graph.rules.iter().enumerate() {
            self.graph
                .by_name
                .entry(rule.name.clone())
                .or_insert(GraphRuleId(i as u32));
        }

        let grammar = self.graph.grammar;
        for node in &mut self.graph.nodes {
            match &mut node.item {
                GraphItem::NonTerminal { name, target } => {
                    if target.is_some() {
                        continue;
                    }
                    *target = self.graph.by_name.get(name.as_str()).copied();
                    if target.is_none() && node.grammar == grammar {
                        self.diagnostics
                            .report(DiagnosticKind::UndefinedRule, node.span)
                            .message(name.as_str())
                            .emit();
                    }
                }
                GraphItem::Embedded {
                    grammar: Some(target),
                    goal,
                    ..
                } if node.grammar == grammar => {
                    if self.resolved.find(self.grammars, *target, goal).is_none() {
                        let qualified = self.grammars.get(*target).qualified_name();
                        self.diagnostics
                            .report(DiagnosticKind::UndefinedRule, node.span)
                            .message(format!("{qualified}::{goal}"))
                            .emit();
                    }
                }
                _ => {}
            }
        }
    }
}
