//! Text dumps of the derived models.

use std::fmt::Write;

use super::Workbench;
use crate::grammar::GrammarId;

impl Workbench {
    /// Rule set of one grammar.
    pub fn dump_rules(&self, id: GrammarId) -> String {
        self.rule_set(id).map(ToString::to_string).unwrap_or_default()
    }

    /// Type namespace of one grammar.
    pub fn dump_types(&self, id: GrammarId) -> String {
        let name = self.grammars().get(id).qualified_name();
        self.type_model()
            .namespace(&name)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Transform unit of one grammar, in override syntax.
    pub fn dump_transforms(&self, id: GrammarId) -> String {
        let name = self.grammars().get(id).qualified_name();
        let Some(unit) = self.transform_model().unit(&name) else {
            return String::new();
        };
        let mut out = String::new();
        let namespace = name.parent();
        if !namespace.is_empty() {
            writeln!(out, "namespace {namespace}").expect("String write never fails");
        }
        write!(out, "{unit}").expect("String write never fails");
        out
    }

    pub fn dump_all_types(&self) -> String {
        self.type_model().to_string()
    }

    pub fn dump_all_transforms(&self) -> String {
        self.transform_model().to_string()
    }

    pub fn dump_diagnostics(&self) -> String {
        self.diagnostics().render(self.source_map())
    }
}
