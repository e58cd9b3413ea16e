//! Leaf compression: each leaf rule collapses into one regular expression.

use indexmap::IndexMap;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::normalize::{GraphItem, GraphItemId, GraphRuleId, RuleGraph, RuleOrigin};
use crate::{Error, PassResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedLeafRule {
    pub name: String,
    pub pattern: String,
    pub is_pattern: bool,
}

/// Compressed leaf rules of one graph, by rule id.
#[derive(Debug, Clone, Default)]
pub struct LeafRules {
    rules: IndexMap<GraphRuleId, CompressedLeafRule>,
}

impl LeafRules {
    pub fn get(&self, id: GraphRuleId) -> Option<&CompressedLeafRule> {
        self.rules.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GraphRuleId, &CompressedLeafRule)> {
        self.rules.iter().map(|(&id, rule)| (id, rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Compress every declared leaf rule of `graph`.
///
/// A leaf rule that reaches itself, references an undefined rule, or yields
/// an invalid pattern is left out.
pub fn compress_leaves(graph: &RuleGraph) -> PassResult<LeafRules> {
    let mut diagnostics = Diagnostics::new();
    let mut leaves = LeafRules::default();

    for id in graph.declared() {
        let rule = graph.rule(id);
        if !rule.is_leaf {
            continue;
        }
        let reports = matches!(rule.origin, RuleOrigin::Declared(r) if r.grammar == graph.grammar());

        let mut compressor = Compressor {
            graph,
            visiting: vec![id],
            failure: None,
        };
        let pattern = compressor.compress(&rule.name, rule.rhs)?;

        match compressor.failure {
            Some(Failure::Cycle) => {
                if reports {
                    diagnostics
                        .report(DiagnosticKind::LeafRuleCycle, rule.span)
                        .message(&rule.name)
                        .emit();
                }
                continue;
            }
            Some(Failure::Unresolved) => continue,
            None => {}
        }

        if let Err(err) = regex_syntax::Parser::new().parse(&pattern) {
            if reports {
                diagnostics
                    .report(DiagnosticKind::InvalidLeafPattern, rule.span)
                    .message(format!("`{pattern}` ({})", error_summary(&err.to_string())))
                    .emit();
            }
            continue;
        }

        tracing::trace!(rule = %rule.name, %pattern, "compressed leaf rule");
        leaves.rules.insert(
            id,
            CompressedLeafRule {
                name: rule.name.clone(),
                pattern,
                is_pattern: true,
            },
        );
    }

    tracing::debug!(leaves = leaves.len(), "compressed leaf rules");
    Ok((leaves, diagnostics))
}

fn error_summary(text: &str) -> &str {
    text.lines().last().unwrap_or(text).trim()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Cycle,
    Unresolved,
}

struct Compressor<'g> {
    graph: &'g RuleGraph,
    visiting: Vec<GraphRuleId>,
    failure: Option<Failure>,
}

impl Compressor<'_> {
    fn compress(&mut self, name: &str, id: GraphItemId) -> Result<String> {
        let pattern = match self.graph.item(id) {
            GraphItem::Terminal(terminal) if terminal.is_pattern => terminal.value.clone(),
            GraphItem::Terminal(terminal) => regex_syntax::escape(&terminal.value),
            GraphItem::Concatenation(items) if items.len() == 1 => self.compress(name, items[0])?,
            GraphItem::Concatenation(items) => {
                let mut pattern = String::new();
                for (i, &item) in items.iter().enumerate() {
                    let part = self.compress(&format!("{name}{i}"), item)?;
                    if has_top_level_alternation(&part) {
                        pattern.push_str(&format!("(?:{part})"));
                    } else {
                        pattern.push_str(&part);
                    }
                }
                pattern
            }
            GraphItem::Choice { alternatives, .. } => {
                let mut parts = Vec::with_capacity(alternatives.len());
                for &alternative in alternatives {
                    parts.push(self.compress(name, alternative)?);
                }
                parts.join("|")
            }
            GraphItem::List { min, max, item } => {
                let inner = self.compress(name, *item)?;
                match max {
                    Some(max) => format!("({inner}){{{min},{max}}}"),
                    None => format!("({inner}){{{min},}}"),
                }
            }
            GraphItem::Optional(item) => format!("({})?", self.compress(name, *item)?),
            GraphItem::Group(item) => format!("({})", self.compress(name, *item)?),
            GraphItem::NonTerminal { target, .. } => match target {
                Some(target) if self.visiting.contains(target) => {
                    self.failure = Some(Failure::Cycle);
                    String::new()
                }
                Some(target) => {
                    self.visiting.push(*target);
                    let rhs = self.graph.rule(*target).rhs;
                    let pattern = self.compress(name, rhs)?;
                    self.visiting.pop();
                    pattern
                }
                None => {
                    self.failure.get_or_insert(Failure::Unresolved);
                    String::new()
                }
            },
            item @ (GraphItem::Embedded { .. } | GraphItem::SeparatedList { .. } | GraphItem::Empty) => {
                return Err(Error::UnsupportedLeafItem {
                    rule: name.to_owned(),
                    item: item_kind(item),
                });
            }
        };
        Ok(pattern)
    }
}

fn item_kind(item: &GraphItem) -> &'static str {
    match item {
        GraphItem::Embedded { .. } => "embedded",
        GraphItem::SeparatedList { .. } => "separated list",
        _ => "empty",
    }
}

/// Whether `pattern` has a `|` outside any group or class.
fn has_top_level_alternation(pattern: &str) -> bool {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => depth = depth.saturating_sub(1),
            '|' if !in_class && depth == 0 => return true,
            _ => {}
        }
    }
    false
}
