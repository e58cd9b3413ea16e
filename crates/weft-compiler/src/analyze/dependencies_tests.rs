use weft_core::QualifiedName;

use super::analyze_dependencies;
use crate::grammar::{GrammarId, GrammarSet};
use crate::test_utils::load_grammars;

fn id(grammars: &GrammarSet, name: &str) -> GrammarId {
    grammars.find(&QualifiedName::parse(name)).unwrap()
}

#[test]
fn dependencies_come_first() {
    let (grammars, diagnostics) =
        load_grammars("grammar A : B { } grammar B { } grammar C { S = A::x ; }");
    assert!(diagnostics.is_empty());

    let dependencies = analyze_dependencies(&grammars);
    let order: Vec<_> = dependencies
        .order()
        .map(|g| grammars.get(g).name.as_str())
        .collect();
    assert_eq!(order, ["B", "A", "C"]);

    let of_c: Vec<_> = dependencies.dependencies(id(&grammars, "C")).collect();
    assert_eq!(of_c, [id(&grammars, "A")]);
    assert!(!dependencies.is_recursive(id(&grammars, "A")));
}

#[test]
fn mutual_extends_form_one_component() {
    let (grammars, _) = load_grammars("grammar X : Y { } grammar Y : X { }");

    let dependencies = analyze_dependencies(&grammars);
    assert_eq!(dependencies.sccs.len(), 1);
    assert_eq!(dependencies.sccs[0].len(), 2);
    assert!(dependencies.is_recursive(id(&grammars, "X")));
    assert!(dependencies.is_recursive(id(&grammars, "Y")));
}

#[test]
fn self_embedding_is_recursive() {
    let (grammars, diagnostics) = load_grammars("grammar R { S = '(' R::S ')' | 'x' ; }");
    assert!(diagnostics.is_empty());

    let dependencies = analyze_dependencies(&grammars);
    assert!(dependencies.is_recursive(id(&grammars, "R")));
}
