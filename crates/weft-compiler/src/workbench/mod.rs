//! Staged pipeline facade.
//!
//! ```text
//! WorkbenchBuilder ──parse()──▶ WorkbenchParsed ──analyze()──▶ Workbench
//! ```
//!
//! Parsing lowers every grammar source into the grammar model and collects
//! transform-override files. Analysis links grammars, resolves extends chains
//! and runs, per grammar and in dependency order: normalization, leaf
//! compression, shape classification, rule set assembly and both derivers.
//! Overrides are merged last, over a copy of the derived baseline.

mod dump;

#[cfg(test)]
mod workbench_tests;

use indexmap::IndexMap;
use weft_core::{ModelBundle, QualifiedName, RuleSet, TransformModel, TypeExpr, TypeModel};

use crate::analyze::{GrammarDependencies, RuleShape, Shapes, analyze_dependencies};
use crate::derive::{OverrideMerger, derive_transforms, derive_types};
use crate::diagnostics::Diagnostics;
use crate::grammar::{Grammar, GrammarId, GrammarSet, Lookup, lower_grammar};
use crate::leaf::{LeafRules, compress_leaves};
use crate::normalize::{RuleGraph, normalize};
use crate::parser::{ParseLimits, TransformFile, parse_grammar, parse_transform};
use crate::resolve::Resolver;
use crate::ruleset::assemble_rule_set;
use crate::source_map::{SourceId, SourceLanguage, SourceMap};

const DEFAULT_PARSE_FUEL: u32 = 1_000_000;
const DEFAULT_PARSE_MAX_DEPTH: u32 = 4096;

#[derive(Debug, Clone)]
pub struct WorkbenchConfig {
    pub parse_fuel: u32,
    pub parse_max_depth: u32,
    /// Grammar the single-grammar views show when none is named.
    pub default_goal: Option<String>,
    /// Apply `#create-missing-types` to every override file.
    pub create_missing_types: bool,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            parse_fuel: DEFAULT_PARSE_FUEL,
            parse_max_depth: DEFAULT_PARSE_MAX_DEPTH,
            default_goal: None,
            create_missing_types: false,
        }
    }
}

pub struct WorkbenchBuilder {
    source_map: SourceMap,
    config: WorkbenchConfig,
}

impl WorkbenchBuilder {
    pub fn new(source_map: SourceMap) -> Self {
        Self {
            source_map,
            config: WorkbenchConfig::default(),
        }
    }

    pub fn one_liner(src: &str) -> Self {
        Self::new(SourceMap::one_liner(src))
    }

    pub fn with_config(mut self, config: WorkbenchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_parse_fuel(mut self, fuel: u32) -> Self {
        self.config.parse_fuel = fuel;
        self
    }

    pub fn with_parse_recursion_limit(mut self, limit: u32) -> Self {
        self.config.parse_max_depth = limit;
        self
    }

    pub fn with_default_goal(mut self, grammar: impl Into<String>) -> Self {
        self.config.default_goal = Some(grammar.into());
        self
    }

    pub fn with_create_missing_types(mut self, enabled: bool) -> Self {
        self.config.create_missing_types = enabled;
        self
    }

    pub fn parse(self) -> crate::Result<WorkbenchParsed> {
        let limits = limits(&self.config);
        let mut diagnostics = Diagnostics::new();
        let mut grammars = Vec::new();
        let mut transforms = Vec::new();

        for source in self.source_map.iter() {
            match source.language {
                SourceLanguage::Grammar => {
                    let (file, diags) = parse_grammar(source.content, source.id, limits)?;
                    diagnostics.extend(diags);
                    for decl in &file.grammars {
                        grammars.push(lower_grammar(decl, source.id)?);
                    }
                }
                SourceLanguage::Transform => {
                    let (file, diags) = parse_transform(source.content, source.id, limits)?;
                    diagnostics.extend(diags);
                    transforms.push((source.id, file));
                }
            }
        }

        tracing::debug!(
            grammars = grammars.len(),
            transforms = transforms.len(),
            "parsed sources"
        );
        Ok(WorkbenchParsed {
            source_map: self.source_map,
            config: self.config,
            grammars,
            transforms,
            diagnostics,
        })
    }
}

fn limits(config: &WorkbenchConfig) -> ParseLimits {
    ParseLimits {
        exec_fuel: Some(config.parse_fuel),
        recursion_limit: Some(config.parse_max_depth),
    }
}

#[derive(Debug)]
pub struct WorkbenchParsed {
    source_map: SourceMap,
    config: WorkbenchConfig,
    grammars: Vec<Grammar>,
    transforms: Vec<(SourceId, TransformFile)>,
    diagnostics: Diagnostics,
}

impl WorkbenchParsed {
    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.clone()
    }

    pub fn grammars(&self) -> &[Grammar] {
        &self.grammars
    }

    pub fn analyze(self) -> crate::Result<Workbench> {
        let WorkbenchParsed {
            source_map,
            config,
            grammars: parsed,
            transforms,
            mut diagnostics,
        } = self;

        let mut grammars = GrammarSet::new();
        for grammar in parsed {
            grammars.add(grammar, &mut diagnostics);
        }
        grammars.link(&mut diagnostics);

        let dependencies = analyze_dependencies(&grammars);
        let (resolved, diags) = Resolver::new(&grammars).resolve_all()?;
        diagnostics.extend(diags);

        let mut graphs: IndexMap<GrammarId, RuleGraph> = IndexMap::new();
        let mut compiled: IndexMap<GrammarId, CompiledGrammar> = IndexMap::new();
        let mut types = IndexMap::new();
        let mut transform_units = IndexMap::new();

        for id in dependencies.order() {
            let (graph, diags) = normalize(&grammars, &resolved, id)?;
            diagnostics.extend(diags);
            let (leaves, diags) = compress_leaves(&graph)?;
            diagnostics.extend(diags);
            let shapes = Shapes::classify(&graph);

            let goal_types = |target: GrammarId, goal: &str| {
                goal_type(&grammars, &graphs, &compiled, target, goal)
            };
            let namespace = derive_types(&grammars, &graph, &shapes, &goal_types);
            let name = grammars.get(id).qualified_name();
            let unit = derive_transforms(&graph, &shapes, name);
            let rule_set = assemble_rule_set(&grammars, &graph, &leaves);

            types.insert(id, namespace);
            transform_units.insert(id, unit);
            graphs.insert(id, graph);
            compiled.insert(
                id,
                CompiledGrammar {
                    leaves,
                    shapes,
                    rule_set,
                },
            );
        }

        // outputs follow declaration order, not processing order
        let mut baseline_types = TypeModel::new();
        let mut baseline_transforms = TransformModel::new();
        for id in grammars.ids() {
            if let Some(namespace) = types.shift_remove(&id) {
                baseline_types.insert_namespace(namespace);
            }
            if let Some(unit) = transform_units.shift_remove(&id) {
                baseline_transforms.insert_unit(unit);
            }
        }
        compiled.sort_by(|a, _, b, _| a.cmp(b));
        graphs.sort_by(|a, _, b, _| a.cmp(b));

        let mut workbench = Workbench {
            source_map,
            config,
            grammars,
            dependencies,
            graphs,
            compiled,
            transform_files: transforms,
            types: baseline_types.clone(),
            transforms: baseline_transforms.clone(),
            baseline_types,
            baseline_transforms,
            grammar_diagnostics: diagnostics,
            override_diagnostics: Diagnostics::new(),
        };
        workbench.merge_overrides();
        Ok(workbench)
    }
}

/// Type of the goal rule `goal` of an already processed grammar.
fn goal_type(
    grammars: &GrammarSet,
    graphs: &IndexMap<GrammarId, RuleGraph>,
    compiled: &IndexMap<GrammarId, CompiledGrammar>,
    target: GrammarId,
    goal: &str,
) -> Option<TypeExpr> {
    let rule = graphs.get(&target)?.find(goal)?;
    let shapes = &compiled.get(&target)?.shapes;
    match shapes.shape(rule)? {
        RuleShape::Leaf => Some(TypeExpr::String),
        _ => {
            let name = shapes.type_name(rule)?;
            Some(TypeExpr::Named(weft_core::TypeRef::new(
                grammars.get(target).qualified_name(),
                name,
            )))
        }
    }
}

/// Per-grammar artifacts computed once during analysis.
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub leaves: LeafRules,
    pub shapes: Shapes,
    pub rule_set: RuleSet,
}

/// Every grammar of a session, analyzed, with derived models.
#[derive(Debug)]
pub struct Workbench {
    source_map: SourceMap,
    config: WorkbenchConfig,
    grammars: GrammarSet,
    dependencies: GrammarDependencies,
    graphs: IndexMap<GrammarId, RuleGraph>,
    compiled: IndexMap<GrammarId, CompiledGrammar>,
    transform_files: Vec<(SourceId, TransformFile)>,
    baseline_types: TypeModel,
    baseline_transforms: TransformModel,
    types: TypeModel,
    transforms: TransformModel,
    grammar_diagnostics: Diagnostics,
    override_diagnostics: Diagnostics,
}

impl Workbench {
    pub fn is_valid(&self) -> bool {
        !self.grammar_diagnostics.has_errors() && !self.override_diagnostics.has_errors()
    }

    /// All diagnostics: parsing and grammar resolution, then transform overrides.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = self.grammar_diagnostics.clone();
        diagnostics.extend(self.override_diagnostics.clone());
        diagnostics
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    pub fn grammars(&self) -> &GrammarSet {
        &self.grammars
    }

    pub fn dependencies(&self) -> &GrammarDependencies {
        &self.dependencies
    }

    pub fn graph(&self, id: GrammarId) -> Option<&RuleGraph> {
        self.graphs.get(&id)
    }

    pub fn compiled(&self, id: GrammarId) -> Option<&CompiledGrammar> {
        self.compiled.get(&id)
    }

    /// Find a grammar by qualified or unambiguous simple name.
    pub fn find_grammar(&self, name: &str) -> Option<GrammarId> {
        match self
            .grammars
            .lookup(&QualifiedName::parse(name), &QualifiedName::default())
        {
            Lookup::Found(id) => Some(id),
            Lookup::Ambiguous(_) | Lookup::NotFound => None,
        }
    }

    /// The configured default grammar, or the last one declared.
    pub fn goal_grammar(&self) -> Option<GrammarId> {
        match &self.config.default_goal {
            Some(name) => self.find_grammar(name),
            None => self.grammars.ids().last(),
        }
    }

    pub fn rule_set(&self, id: GrammarId) -> Option<&RuleSet> {
        self.compiled.get(&id).map(|c| &c.rule_set)
    }

    pub fn rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        self.compiled.values().map(|c| &c.rule_set)
    }

    /// Type model with overrides merged in.
    pub fn type_model(&self) -> &TypeModel {
        &self.types
    }

    /// Transform model with overrides merged in.
    pub fn transform_model(&self) -> &TransformModel {
        &self.transforms
    }

    pub fn baseline_type_model(&self) -> &TypeModel {
        &self.baseline_types
    }

    pub fn baseline_transform_model(&self) -> &TransformModel {
        &self.baseline_transforms
    }

    pub fn bundle(&self) -> ModelBundle {
        ModelBundle {
            rule_sets: self.rule_sets().cloned().collect(),
            types: self.types.clone(),
            transforms: self.transforms.clone(),
        }
    }

    /// Add an override fragment and re-merge every fragment over the baseline.
    pub fn apply_overrides(&mut self, content: &str) -> crate::Result<SourceId> {
        let id = self.source_map.add_transform_one_liner(content);
        let (file, diags) = parse_transform(content, id, limits(&self.config))?;
        self.grammar_diagnostics.extend(diags);
        self.transform_files.push((id, file));
        self.merge_overrides();
        Ok(id)
    }

    fn merge_overrides(&mut self) {
        self.types = self.baseline_types.clone();
        self.transforms = self.baseline_transforms.clone();
        if self.transform_files.is_empty() {
            self.override_diagnostics = Diagnostics::new();
            return;
        }

        let mut merger = OverrideMerger::new(
            &self.grammars,
            &self.graphs,
            &mut self.types,
            &mut self.transforms,
        )
        .with_create_missing_types(self.config.create_missing_types);
        for (source, file) in &self.transform_files {
            merger.merge(file, *source);
        }
        self.override_diagnostics = merger.finish();
        tracing::debug!(
            diagnostics = self.override_diagnostics.len(),
            "merged transform overrides"
        );
    }
}

impl TryFrom<&str> for Workbench {
    type Error = crate::Error;

    fn try_from(src: &str) -> crate::Result<Self> {
        WorkbenchBuilder::one_liner(src).parse()?.analyze()
    }
}

