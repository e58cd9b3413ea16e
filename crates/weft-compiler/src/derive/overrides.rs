//! Merging user transform overrides over the derived baseline.
//!
//! Each `transform` block names a grammar and supplies rules by name. By
//! default a user rule replaces the generated rule of the same name and every
//! other rule keeps its baseline construction. Under
//! `#override-default-transform` the block must supply every declared rule;
//! with `#create-missing-types` as well, the missing ones are taken from the
//! baseline and reported as information.

use indexmap::IndexMap;
use weft_core::transform::STRING_TYPE;
use weft_core::{
    Assignment, Construction, DataType, Expr, Property, QualifiedName, TransformModel,
    TransformOrigin, TransformRule, TransformUnit, TypeDecl, TypeExpr, TypeModel, TypeNamespace,
    TypeRef,
};

use crate::SourceId;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::grammar::{GrammarId, GrammarSet, Lookup};
use crate::normalize::RuleGraph;
use crate::parser::ast::{
    AssignmentDecl, Directives, RuleBody, TransformBlock, TransformFile, TransformRuleDecl,
};

/// Merges parsed override files into a type and transform model.
pub struct OverrideMerger<'a> {
    grammars: &'a GrammarSet,
    graphs: &'a IndexMap<GrammarId, RuleGraph>,
    types: &'a mut TypeModel,
    transforms: &'a mut TransformModel,
    create_missing_types: bool,
    diagnostics: Diagnostics,
}

impl<'a> OverrideMerger<'a> {
    pub fn new(
        grammars: &'a GrammarSet,
        graphs: &'a IndexMap<GrammarId, RuleGraph>,
        types: &'a mut TypeModel,
        transforms: &'a mut TransformModel,
    ) -> Self {
        Self {
            grammars,
            graphs,
            types,
            transforms,
            create_missing_types: false,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Treat every file as if it started with `#create-missing-types`.
    pub fn with_create_missing_types(mut self, enabled: bool) -> Self {
        self.create_missing_types = enabled;
        self
    }

    pub fn merge(&mut self, file: &TransformFile, source: SourceId) {
        for scope in &file.scopes {
            let directives = file.directives.combine(&scope.directives);
            let namespace = scope.namespace.clone().unwrap_or_default();
            for block in &scope.blocks {
                let directives = directives.combine(&block.directives);
                self.merge_block(&namespace, block, &directives, source);
            }
        }
    }

    pub fn finish(self) -> Diagnostics {
        self.diagnostics
    }

    fn merge_block(
        &mut self,
        namespace: &QualifiedName,
        block: &TransformBlock,
        directives: &Directives,
        source: SourceId,
    ) {
        let span = Some(Span::new(source, block.grammar_range));
        let name = QualifiedName::parse(&block.grammar);
        let graph = match self.grammars.lookup(&name, namespace) {
            Lookup::Found(id) => self.graphs.get(&id),
            Lookup::Ambiguous(_) | Lookup::NotFound => None,
        };
        let Some(graph) = graph else {
            self.diagnostics
                .report(DiagnosticKind::UnknownTransformGrammar, span)
                .message(&block.grammar)
                .emit();
            return;
        };

        let grammar = self.grammars.get(graph.grammar()).qualified_name();
        let create_missing = self.create_missing_types || directives.create_missing_types;
        tracing::debug!(%grammar, rules = block.rules.len(), "merging transform block");

        let mut supplied: IndexMap<String, TransformRule> = IndexMap::new();
        for decl in &block.rules {
            let rule_span = Some(Span::new(source, decl.rule_range));
            if graph.find(&decl.rule).is_none() {
                self.diagnostics
                    .report(DiagnosticKind::UnknownTransformRule, rule_span)
                    .message(&decl.rule)
                    .emit();
                continue;
            }
            let Some(construction) = self.user_construction(&grammar, decl, create_missing, source)
            else {
                continue;
            };
            supplied.insert(
                decl.rule.clone(),
                TransformRule {
                    rule: decl.rule.clone(),
                    construction,
                    origin: TransformOrigin::User,
                },
            );
        }

        let unit = self
            .transforms
            .units
            .entry(grammar.clone())
            .or_insert_with(|| TransformUnit::new(grammar.clone(), grammar.clone()));

        // rebuilt in graph order so replaced and added rules sit where the grammar declares them
        let mut rules = IndexMap::new();
        for id in graph.rule_ids() {
            let rule = graph.rule(id);
            let existing = unit.rules.get(&rule.name);
            let chosen = if let Some(user) = supplied.shift_remove(&rule.name) {
                Some(user)
            } else if !directives.override_default_transform || rule.is_pseudo() {
                existing.cloned()
            } else {
                match existing {
                    Some(kept) if kept.origin == TransformOrigin::User => Some(kept.clone()),
                    Some(baseline) if create_missing => {
                        self.diagnostics
                            .report(DiagnosticKind::MissingRuleGenerated, span)
                            .message(&rule.name)
                            .emit();
                        Some(TransformRule {
                            origin: TransformOrigin::Synthesized,
                            ..baseline.clone()
                        })
                    }
                    Some(_) => {
                        self.diagnostics
                            .report(DiagnosticKind::MissingTransformRule, span)
                            .message(&rule.name)
                            .emit();
                        None
                    }
                    None => None,
                }
            };
            if let Some(chosen) = chosen {
                rules.insert(chosen.rule.clone(), chosen);
            }
        }
        unit.rules = rules;
    }

    /// Construction for one user rule, or `None` when its type is unknown.
    fn user_construction(
        &mut self,
        grammar: &QualifiedName,
        decl: &TransformRuleDecl,
        create_missing: bool,
        source: SourceId,
    ) -> Option<Construction> {
        let (construction, type_range, assignments): (_, _, &[AssignmentDecl]) = match &decl.body {
            RuleBody::Create {
                type_name,
                type_range,
                assignments,
            } => {
                let construction = Construction::CreateObject {
                    type_name: type_name.clone(),
                    assignments: assignments
                        .iter()
                        .map(|a| Assignment::new(&a.property, a.expr.clone()))
                        .collect(),
                };
                (construction, *type_range, assignments.as_slice())
            }
            RuleBody::Expr { expr, range } => {
                (Construction::from_expr(expr.clone()), *range, &[])
            }
        };

        let Some(type_name) = construction.type_name() else {
            return Some(construction);
        };
        if type_name == STRING_TYPE {
            return Some(construction);
        }

        let span = Some(Span::new(source, type_range));
        let ty = type_ref(grammar, type_name);
        if self.types.find(&ty).is_none() {
            if !create_missing {
                self.diagnostics
                    .report(DiagnosticKind::UnknownType, span)
                    .message(type_name)
                    .emit();
                return None;
            }
            let created = self.synthesize_type(grammar, &decl.rule, &ty, assignments);
            self.declare(&ty, created);
            self.diagnostics
                .report(DiagnosticKind::TypeCreated, span)
                .message(ty.display_in(grammar))
                .emit();
        }

        if let Some(TypeDecl::Data(data)) = self.types.find(&ty) {
            for assignment in assignments {
                if data.property(&assignment.property).is_none() {
                    self.diagnostics
                        .report(
                            DiagnosticKind::UnknownProperty,
                            Some(Span::new(source, assignment.range)),
                        )
                        .message(format!("`{}` on `{}`", assignment.property, data.name))
                        .emit();
                }
            }
        }
        Some(construction)
    }

    /// A data type whose properties come from a rule's assignments.
    ///
    /// A property keeps the type, nullability and index of the same-named
    /// property of the rule's baseline type; otherwise they are inferred from
    /// the assigned expression.
    fn synthesize_type(
        &self,
        grammar: &QualifiedName,
        rule: &str,
        ty: &TypeRef,
        assignments: &[AssignmentDecl],
    ) -> DataType {
        let baseline = self
            .transforms
            .find(grammar, rule)
            .and_then(|r| r.construction.type_name())
            .and_then(|name| self.types.find(&type_ref(grammar, name)))
            .and_then(TypeDecl::as_data);

        let mut data = DataType::new(&ty.name);
        for (ordinal, assignment) in assignments.iter().enumerate() {
            let property = match baseline.and_then(|b| b.property(&assignment.property)) {
                Some(property) => property.clone(),
                None => Property {
                    name: assignment.property.clone(),
                    ty: infer_type(grammar, &assignment.expr),
                    nullable: false,
                    declared_index: declared_index(&assignment.expr).unwrap_or(ordinal as u32),
                },
            };
            data.properties.push(property);
        }
        data
    }

    fn declare(&mut self, ty: &TypeRef, data: DataType) {
        if self.types.namespace(&ty.namespace).is_none() {
            self.types
                .insert_namespace(TypeNamespace::new(ty.namespace.clone()));
        }
        if let Some(namespace) = self.types.namespace_mut(&ty.namespace) {
            namespace.declare(TypeDecl::Data(data));
        }
    }
}

/// `Name` refers to the grammar's own namespace, `a.b.Name` to namespace `a.b`.
fn type_ref(grammar: &QualifiedName, name: &str) -> TypeRef {
    let qualified = QualifiedName::parse(name);
    if qualified.is_qualified() {
        TypeRef::new(qualified.parent(), qualified.last().unwrap_or_default())
    } else {
        TypeRef::new(grammar.clone(), name)
    }
}

fn infer_type(grammar: &QualifiedName, expr: &Expr) -> TypeExpr {
    match expr {
        Expr::Cast { type_name, .. } if type_name == STRING_TYPE => TypeExpr::String,
        Expr::Cast { type_name, .. } => TypeExpr::Named(type_ref(grammar, type_name)),
        Expr::Children | Expr::ChildrenItems => TypeExpr::List(Box::new(TypeExpr::Any)),
        Expr::Tuple(assignments) => TypeExpr::Tuple(
            assignments
                .iter()
                .enumerate()
                .map(|(ordinal, assignment)| Property {
                    name: assignment.property.clone(),
                    ty: infer_type(grammar, &assignment.expr),
                    nullable: false,
                    declared_index: declared_index(&assignment.expr).unwrap_or(ordinal as u32),
                })
                .collect(),
        ),
        Expr::Nothing => TypeExpr::Nothing,
        Expr::ChildAt(_) | Expr::With { .. } | Expr::When { .. } | Expr::SelfRef => TypeExpr::Any,
    }
}

fn declared_index(expr: &Expr) -> Option<u32> {
    match expr {
        Expr::ChildAt(index) => Some(*index),
        Expr::With { inner, .. } | Expr::Cast { expr: inner, .. } => declared_index(inner),
        _ => None,
    }
}

