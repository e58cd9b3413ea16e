//! Type model derivation.

use weft_core::utils::to_pascal_case;
use weft_core::{
    DataType, PrimitiveType, Property, QualifiedName, TypeDecl, TypeExpr, TypeNamespace, TypeRef,
    UnionType,
};

use crate::analyze::{Field, NodeValue, RuleShape, Shapes, Value};
use crate::grammar::{GrammarId, GrammarSet};
use crate::normalize::{GraphRuleId, RuleGraph};

/// Looks up the type produced by the goal rule of another grammar.
pub type GoalTypes<'a> = dyn Fn(GrammarId, &str) -> Option<TypeExpr> + 'a;

/// Derive the type namespace of the grammar `graph` was built from.
///
/// Leaf, skip and pseudo rules produce no type of their own.
pub fn derive_types(
    grammars: &GrammarSet,
    graph: &RuleGraph,
    shapes: &Shapes,
    goal_types: &GoalTypes<'_>,
) -> TypeNamespace {
    let name = grammars.get(graph.grammar()).qualified_name();
    let mut deriver = TypeDeriver {
        grammars,
        shapes,
        goal_types,
        namespace: TypeNamespace::new(name),
    };

    let mut supertypes: Vec<(GraphRuleId, &[GraphRuleId])> = Vec::new();
    for (id, shape) in shapes.iter() {
        let Some(type_name) = shapes.type_name(id) else {
            continue;
        };
        let decl = match shape {
            RuleShape::Leaf => continue,
            RuleShape::Primitive => TypeDecl::Primitive(PrimitiveType {
                name: type_name.to_owned(),
            }),
            RuleShape::Data(fields) => {
                let mut data = DataType::new(type_name);
                data.properties = deriver.properties(fields);
                TypeDecl::Data(data)
            }
            RuleShape::Supertype(members) => {
                supertypes.push((id, members));
                TypeDecl::Data(DataType::new(type_name))
            }
            RuleShape::Union(alternatives) => TypeDecl::Union(UnionType {
                name: type_name.to_owned(),
                members: alternatives
                    .iter()
                    .map(|(_, value)| deriver.value_type(value))
                    .collect(),
            }),
        };
        deriver.namespace.declare(decl);
    }

    for (id, members) in supertypes {
        deriver.link_subtypes(id, members);
    }

    tracing::debug!(
        namespace = %deriver.namespace.name,
        types = deriver.namespace.types.len(),
        "derived type namespace"
    );
    deriver.namespace
}

struct TypeDeriver<'a> {
    grammars: &'a GrammarSet,
    shapes: &'a Shapes,
    goal_types: &'a GoalTypes<'a>,
    namespace: TypeNamespace,
}

impl TypeDeriver<'_> {
    fn properties(&mut self, fields: &[Field]) -> Vec<Property> {
        fields
            .iter()
            .map(|field| Property {
                name: field.name.clone(),
                ty: self.value_type(&field.value),
                nullable: field.nullable,
                declared_index: field.index,
            })
            .collect()
    }

    fn value_type(&mut self, value: &Value) -> TypeExpr {
        match value {
            Value::Node(NodeValue::Text) => TypeExpr::String,
            Value::Node(NodeValue::Rule(id)) => match self.shapes.type_name(*id) {
                Some(name) => TypeExpr::Named(self.namespace.type_ref(name)),
                None => TypeExpr::String,
            },
            Value::Node(NodeValue::Embedded {
                grammar,
                grammar_name,
                goal,
            }) => self.embedded_type(*grammar, grammar_name, goal),
            Value::Child(_, inner) | Value::Optional(inner) => self.value_type(inner),
            Value::Children { element, .. } => TypeExpr::List(Box::new(self.value_type(element))),
            Value::Tuple(fields) => TypeExpr::Tuple(self.properties(fields)),
            Value::Alternatives(alternatives) => TypeExpr::Union(
                alternatives
                    .iter()
                    .map(|(_, value)| self.value_type(value))
                    .collect(),
            ),
            Value::Nothing => TypeExpr::Nothing,
        }
    }

    fn embedded_type(
        &mut self,
        grammar: Option<GrammarId>,
        written: &QualifiedName,
        goal: &str,
    ) -> TypeExpr {
        let namespace = grammar.map_or_else(
            || written.clone(),
            |id| self.grammars.get(id).qualified_name(),
        );
        let ty = grammar
            .and_then(|id| (self.goal_types)(id, goal))
            .unwrap_or_else(|| {
                TypeExpr::Named(TypeRef::new(namespace.clone(), to_pascal_case(goal)))
            });
        if matches!(ty, TypeExpr::Named(_)) {
            self.namespace.add_import(namespace);
        }
        ty
    }

    fn link_subtypes(&mut self, supertype: GraphRuleId, members: &[GraphRuleId]) {
        let Some(super_name) = self.shapes.type_name(supertype) else {
            return;
        };
        let super_ref = self.namespace.type_ref(super_name);
        for &member in members {
            let Some(member_name) = self.shapes.type_name(member) else {
                continue;
            };
            let member_ref = self.namespace.type_ref(member_name);
            let Some(data) = self.namespace.data_type_mut(member_name) else {
                continue;
            };
            data.add_supertype(super_ref.clone());
            if let Some(data) = self.namespace.data_type_mut(super_name) {
                data.add_subtype(member_ref);
            }
        }
    }
}
