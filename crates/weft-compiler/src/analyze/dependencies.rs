//! Dependency analysis between grammars.
//!
//! A grammar depends on the grammars it extends and the grammars it embeds.
//! Strongly connected components are exposed leaves first, so every grammar is
//! processed after the grammars it refers to.

use indexmap::{IndexMap, IndexSet};

use crate::grammar::{GrammarId, GrammarSet, RuleItem};

#[derive(Clone, Debug, Default)]
pub struct GrammarDependencies {
    /// Strongly connected components in reverse topological order.
    pub sccs: Vec<Vec<GrammarId>>,
    edges: IndexMap<GrammarId, IndexSet<GrammarId>>,
}

impl GrammarDependencies {
    /// Grammars in processing order.
    pub fn order(&self) -> impl Iterator<Item = GrammarId> + '_ {
        self.sccs.iter().flatten().copied()
    }

    /// Grammars `id` refers to directly.
    pub fn dependencies(&self, id: GrammarId) -> impl Iterator<Item = GrammarId> + '_ {
        self.edges.get(&id).into_iter().flatten().copied()
    }

    /// Whether `id` reaches itself through extends or embedded references.
    pub fn is_recursive(&self, id: GrammarId) -> bool {
        self.sccs
            .iter()
            .find(|scc| scc.contains(&id))
            .is_some_and(|scc| scc.len() > 1 || self.dependencies(id).any(|d| d == id))
    }
}

pub fn analyze_dependencies(grammars: &GrammarSet) -> GrammarDependencies {
    let mut edges: IndexMap<GrammarId, IndexSet<GrammarId>> = IndexMap::new();
    for (id, grammar) in grammars.iter() {
        let targets = edges.entry(id).or_default();
        targets.extend(grammar.extends.iter().filter_map(|r| r.target));
        for node in grammar.items() {
            if let RuleItem::Embedded { grammar, .. } = &node.item
                && let Some(target) = grammar.target
            {
                targets.insert(target);
            }
        }
    }

    let sccs = SccFinder::find(&edges);
    GrammarDependencies { sccs, edges }
}

struct SccFinder<'a> {
    edges: &'a IndexMap<GrammarId, IndexSet<GrammarId>>,
    index: usize,
    stack: Vec<GrammarId>,
    on_stack: IndexSet<GrammarId>,
    indices: IndexMap<GrammarId, usize>,
    lowlinks: IndexMap<GrammarId, usize>,
    sccs: Vec<Vec<GrammarId>>,
}

impl<'a> SccFinder<'a> {
    fn find(edges: &'a IndexMap<GrammarId, IndexSet<GrammarId>>) -> Vec<Vec<GrammarId>> {
        let mut finder = Self {
            edges,
            index: 0,
            stack: Vec::new(),
            on_stack: IndexSet::new(),
            indices: IndexMap::new(),
            lowlinks: IndexMap::new(),
            sccs: Vec::new(),
        };

        for &id in edges.keys() {
            if !finder.indices.contains_key(&id) {
                finder.strongconnect(id);
            }
        }

        finder.sccs
    }

    fn strongconnect(&mut self, id: GrammarId) {
        self.indices.insert(id, self.index);
        self.lowlinks.insert(id, self.index);
        self.index += 1;
        self.stack.push(id);
        self.on_stack.insert(id);

        if let Some(targets) = self.edges.get(&id) {
            for &target in targets {
                if !self.indices.contains_key(&target) {
                    self.strongconnect(target);
                    let target_lowlink = self.lowlinks[&target];
                    let lowlink = &mut self.lowlinks[&id];
                    *lowlink = (*lowlink).min(target_lowlink);
                } else if self.on_stack.contains(&target) {
                    let target_index = self.indices[&target];
                    let lowlink = &mut self.lowlinks[&id];
                    *lowlink = (*lowlink).min(target_index);
                }
            }
        }

        if self.lowlinks[&id] == self.indices[&id] {
            let mut scc = Vec::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.swap_remove(&member);
                scc.push(member);
                if member == id {
                    break;
                }
            }
            scc.reverse();
            self.sccs.push(scc);
        }
    }
}
