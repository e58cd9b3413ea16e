use indoc::indoc;

use super::{RuleShape, Shapes};
use crate::normalize::{RuleGraph, normalize};
use crate::resolve::Resolver;
use crate::test_utils::load_grammars;

fn graph(source: &str) -> RuleGraph {
    let (grammars, diagnostics) = load_grammars(source);
    assert!(diagnostics.is_empty(), "unexpected diagnostics");
    let (resolved, _) = Resolver::new(&grammars).resolve_all().unwrap();
    let id = grammars.ids().last().unwrap();
    normalize(&grammars, &resolved, id).unwrap().0
}

/// One `rule: shape` line per classified rule.
fn shapes(source: &str) -> String {
    let graph = graph(source);
    let shapes = Shapes::classify(&graph);
    shapes
        .iter()
        .map(|(id, shape)| {
            let desc = match shape {
                RuleShape::Leaf => "leaf".to_owned(),
                RuleShape::Primitive => "primitive".to_owned(),
                RuleShape::Data(fields) => {
                    let fields: Vec<_> = fields
                        .iter()
                        .map(|f| format!("{}{}", f.name, if f.nullable { "?" } else { "" }))
                        .collect();
                    format!("data({})", fields.join(", "))
                }
                RuleShape::Supertype(members) => {
                    let members: Vec<_> =
                        members.iter().map(|&m| graph.rule(m).name.as_str()).collect();
                    format!("supertype({})", members.join(", "))
                }
                RuleShape::Union(alternatives) => format!("union({})", alternatives.len()),
            };
            format!("{}: {desc}\n", graph.rule(id).name)
        })
        .collect()
}

#[test]
fn choice_of_data_rules_is_supertype() {
    let source = indoc! {r#"
        grammar G {
            S = A | B | C ;
            A = 'a' x ;
            B = 'b' x ;
            C = x x ;
            x = "[a-z]+" ;
        }
    "#};

    insta::assert_snapshot!(shapes(source), @r"
    S: supertype(A, B, C)
    A: data(x)
    B: data(x)
    C: data(x, x2)
    x: primitive
    ");
}

#[test]
fn mixed_choice_is_union() {
    let source = r#"grammar G { S = a | S1 ; S1 = S a ; a = "[a-z]+" ; }"#;

    insta::assert_snapshot!(shapes(source), @r"
    S: union(2)
    S1: data(S, a)
    a: primitive
    ");
}

#[test]
fn text_only_rules_are_primitive() {
    let source = r#"grammar G { S = 'a' | 'b' ; T = "[0-9]+" ; U = T ; leaf w = "[a-z]" ; skip ws = " " ; }"#;

    insta::assert_snapshot!(shapes(source), @r"
    S: primitive
    T: primitive
    U: primitive
    w: leaf
    ");
}

#[test]
fn fields_skip_literals_and_mark_optionals() {
    let source = r#"grammar G { S = a 'b'? c? ; a = "x" ; c = "y" ; }"#;

    insta::assert_snapshot!(shapes(source), @r"
    S: data(a, c?)
    a: primitive
    c: primitive
    ");
}

#[test]
fn repeated_fields_are_numbered() {
    let source = r#"grammar G { S = a ',' a ',' a ; a = "x" ; }"#;

    insta::assert_snapshot!(shapes(source), @r"
    S: data(a, a2, a3)
    a: primitive
    ");
}

#[test]
fn groups_without_information_have_no_field() {
    let source = r#"grammar G { S = ('b' 'c' 'd') ; T = (b c d) ; b = "b" ; c = "c" ; d = "d" ; }"#;

    insta::assert_snapshot!(shapes(source), @r"
    S: data()
    T: data($group)
    b: primitive
    c: primitive
    d: primitive
    ");
}

#[test]
fn colliding_type_names_are_numbered() {
    let source = r#"grammar G { foo_bar = a a ; fooBar = a a ; leaf a = "x" ; }"#;
    let graph = graph(source);
    let shapes = Shapes::classify(&graph);

    let names: Vec<_> = graph
        .declared()
        .filter_map(|id| shapes.type_name(id))
        .collect();
    assert_eq!(names, ["FooBar", "FooBar2"]);
}

#[test]
fn pseudo_rules_carry_their_value() {
    let source = r#"grammar G { S = a (',' a)* ; a = "x" ; }"#;
    let graph = graph(source);
    let shapes = Shapes::classify(&graph);

    let multi = graph.find("§S§multi1").unwrap();
    assert!(shapes.pseudo_value(multi).is_some());
    assert!(shapes.shape(multi).is_none());
}

#[test]
fn parenthesized_sub_choice_is_flattened() {
    let source = "grammar G { S = A | (B | C) ; A = a a ; B = a a a ; C = a 'c' a ; leaf a = 'a' ; }";

    insta::assert_snapshot!(shapes(source), @r"
    S: supertype(A, B, C)
    A: data(a, a2)
    B: data(a, a2, a3)
    C: data(a, a2)
    a: leaf
    ");
}

#[test]
fn mutually_recursive_choices_become_unions() {
    let source = indoc! {"
        grammar G {
            T = S | B ;
            S = A | B ;
            A = S | B ;
            B = b b ;
            leaf b = 'b' ;
        }
    "};

    insta::assert_snapshot!(shapes(source), @r"
    T: union(2)
    S: union(2)
    A: union(2)
    B: data(b, b2)
    b: leaf
    ");
}
