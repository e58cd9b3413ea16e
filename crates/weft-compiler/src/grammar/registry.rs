//! Grammar registry and cross-grammar reference linking.

use indexmap::IndexMap;
use weft_core::QualifiedName;

use super::model::{Grammar, GrammarId, GrammarRef, RuleItem};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Outcome of looking up a grammar name from some namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(GrammarId),
    Ambiguous(Vec<GrammarId>),
    NotFound,
}

/// All grammars known to a workbench, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct GrammarSet {
    grammars: Vec<Grammar>,
    by_name: IndexMap<QualifiedName, GrammarId>,
}

impl GrammarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grammar. A second grammar with the same qualified name is
    /// reported and dropped.
    pub fn add(&mut self, grammar: Grammar, diagnostics: &mut Diagnostics) -> Option<GrammarId> {
        let name = grammar.qualified_name();
        if let Some(&existing) = self.by_name.get(&name) {
            let previous = self.get(existing).span;
            diagnostics
                .report(DiagnosticKind::DuplicateGrammar, grammar.span)
                .message(name.to_string())
                .related_to("first defined here", previous)
                .emit();
            return None;
        }

        let id = GrammarId(self.grammars.len() as u32);
        self.grammars.push(grammar);
        self.by_name.insert(name, id);
        Some(id)
    }

    pub fn get(&self, id: GrammarId) -> &Grammar {
        &self.grammars[id.index()]
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = GrammarId> + use<> {
        (0..self.grammars.len() as u32).map(GrammarId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GrammarId, &Grammar)> {
        self.grammars
            .iter()
            .enumerate()
            .map(|(i, g)| (GrammarId(i as u32), g))
    }

    pub fn find(&self, name: &QualifiedName) -> Option<GrammarId> {
        self.by_name.get(name).copied()
    }

    /// Resolve `name` as written inside `namespace`.
    ///
    /// An exact qualified match wins, then a grammar of that name in the same
    /// namespace, then a unique grammar whose qualified name ends with `name`.
    pub fn lookup(&self, name: &QualifiedName, namespace: &QualifiedName) -> Lookup {
        if let Some(id) = self.find(name) {
            return Lookup::Found(id);
        }

        let mut local = namespace.clone();
        for part in name.parts() {
            local = local.child(part);
        }
        if let Some(id) = self.find(&local) {
            return Lookup::Found(id);
        }

        let candidates: Vec<GrammarId> = self
            .by_name
            .iter()
            .filter(|(qn, _)| qn.parts().ends_with(name.parts()))
            .map(|(_, &id)| id)
            .collect();
        match candidates.as_slice() {
            [] => Lookup::NotFound,
            [id] => Lookup::Found(*id),
            _ => Lookup::Ambiguous(candidates),
        }
    }

    /// Resolve every extends and embedded reference. Unresolved references stay
    /// `None` and are reported.
    pub fn link(&mut self, diagnostics: &mut Diagnostics) {
        for index in 0..self.grammars.len() {
            let namespace = self.grammars[index].namespace.clone();

            let mut extends = std::mem::take(&mut self.grammars[index].extends);
            for reference in &mut extends {
                self.link_ref(reference, &namespace, diagnostics);
            }
            self.grammars[index].extends = extends;

            let mut items = std::mem::take(&mut self.grammars[index].items);
            for node in &mut items {
                if let RuleItem::Embedded { grammar, .. } = &mut node.item {
                    self.link_ref(grammar, &namespace, diagnostics);
                }
            }
            self.grammars[index].items = items;
        }
        tracing::debug!(grammars = self.grammars.len(), "linked grammar references");
    }

    fn link_ref(
        &self,
        reference: &mut GrammarRef,
        namespace: &QualifiedName,
        diagnostics: &mut Diagnostics,
    ) {
        match self.lookup(&reference.name, namespace) {
            Lookup::Found(id) => reference.target = Some(id),
            Lookup::NotFound => diagnostics
                .report(DiagnosticKind::UnresolvedGrammar, reference.span)
                .message(reference.name.to_string())
                .emit(),
            Lookup::Ambiguous(candidates) => {
                let names: Vec<String> = candidates
                    .iter()
                    .map(|&id| format!("`{}`", self.get(id).qualified_name()))
                    .collect();
                diagnostics
                    .report(DiagnosticKind::AmbiguousGrammar, reference.span)
                    .message(format!("`{}` matches {}", reference.name, names.join(", ")))
                    .emit();
            }
        }
    }
}
