//! Baseline transform derivation.

use weft_core::{
    Assignment, Construction, Expr, QualifiedName, TransformOrigin, TransformRule, TransformUnit,
    WhenBranch,
};

use crate::analyze::{Field, RuleShape, Shapes, Value};
use crate::normalize::RuleGraph;

/// Derive the transform unit of the grammar `graph` was built from.
///
/// Declared rules come first, in resolved order, followed by the pseudo-rules
/// that pass a value up to their owner.
pub fn derive_transforms(graph: &RuleGraph, shapes: &Shapes, grammar: QualifiedName) -> TransformUnit {
    let mut unit = TransformUnit::new(grammar.clone(), grammar);

    for (id, shape) in shapes.iter() {
        let type_name = shapes.type_name(id).unwrap_or_default().to_owned();
        let construction = match shape {
            RuleShape::Leaf => Construction::LeafString,
            RuleShape::Primitive => Construction::PassThrough(Expr::ChildAt(0)),
            RuleShape::Data(fields) => Construction::CreateObject {
                type_name,
                assignments: assignments(fields),
            },
            RuleShape::Supertype(_) => Construction::SubtypeDispatch { type_name },
            RuleShape::Union(alternatives) => Construction::UnionDispatch {
                type_name,
                branches: branches(alternatives),
                otherwise: Expr::Nothing,
            },
        };
        unit.insert(TransformRule {
            rule: graph.rule(id).name.clone(),
            construction,
            origin: TransformOrigin::Generated,
        });
    }

    for id in graph.rule_ids() {
        let Some(value) = shapes.pseudo_value(id) else {
            continue;
        };
        unit.insert(TransformRule {
            rule: graph.rule(id).name.clone(),
            construction: Construction::PassThrough(value_expr(value)),
            origin: TransformOrigin::Generated,
        });
    }

    tracing::debug!(grammar = %unit.grammar, rules = unit.rules.len(), "derived transforms");
    unit
}

fn assignments(fields: &[Field]) -> Vec<Assignment> {
    fields
        .iter()
        .map(|field| Assignment::new(&field.name, value_expr(&field.value)))
        .collect()
}

fn branches(alternatives: &[(u32, Value)]) -> Vec<WhenBranch> {
    alternatives
        .iter()
        .map(|(alternative, value)| WhenBranch {
            alternative: *alternative,
            expr: value_expr(value),
        })
        .collect()
}

/// Expression computing `value` from the current node.
pub(crate) fn value_expr(value: &Value) -> Expr {
    match value {
        Value::Node(_) => Expr::SelfRef,
        Value::Child(index, inner) => match **inner {
            Value::Node(_) => Expr::ChildAt(*index),
            ref inner => Expr::with(Expr::ChildAt(*index), value_expr(inner)),
        },
        Value::Optional(inner) => value_expr(inner),
        Value::Children {
            separated: false, ..
        } => Expr::Children,
        Value::Children {
            separated: true, ..
        } => Expr::ChildrenItems,
        Value::Tuple(fields) => Expr::Tuple(assignments(fields)),
        Value::Alternatives(alternatives) => Expr::When {
            branches: branches(alternatives),
            otherwise: Box::new(Expr::Nothing),
        },
        Value::Nothing => Expr::Nothing,
    }
}
