use crate::leaf::{LeafRules, compress_leaves};
use crate::normalize::{RuleGraph, normalize};
use crate::resolve::Resolver;
use crate::test_utils::load_grammars;
use crate::{Diagnostics, Error};

fn graph(source: &str) -> RuleGraph {
    let (grammars, _) = load_grammars(source);
    let (resolved, _) = Resolver::new(&grammars).resolve_all().unwrap();
    let id = grammars.ids().last().unwrap();
    normalize(&grammars, &resolved, id).unwrap().0
}

fn compress(source: &str) -> (RuleGraph, LeafRules, Diagnostics) {
    let graph = graph(source);
    let (leaves, diagnostics) = compress_leaves(&graph).unwrap();
    (graph, leaves, diagnostics)
}

fn pattern(source: &str, rule: &str) -> String {
    let (graph, leaves, diagnostics) = compress(source);
    assert!(diagnostics.is_empty(), "unexpected diagnostics");
    let id = graph.find(rule).unwrap();
    leaves.get(id).unwrap().pattern.clone()
}

#[test]
fn literals_concatenate() {
    assert_eq!(pattern("grammar G { leaf a = 'a' 'a' ; }", "a"), "aa");
}

#[test]
fn literals_are_escaped() {
    assert_eq!(pattern("grammar G { leaf dots = '..' ; }", "dots"), r"\.\.");
}

#[test]
fn lifted_constructs_are_inlined() {
    let source = r#"grammar G { leaf num = "[0-9]+" ('.' "[0-9]+")? ; }"#;

    assert_eq!(pattern(source, "num"), r"[0-9]+((\.[0-9]+))?");
}

#[test]
fn grouped_choice_keeps_its_group() {
    let source = r#"grammar G { leaf kw = ('if' | 'else') "[a-z]*" ; }"#;

    assert_eq!(pattern(source, "kw"), "(if|else)[a-z]*");
}

#[test]
fn referenced_choice_is_wrapped_in_concatenation() {
    let source = r#"grammar G { leaf op = sign digit ; sign = '+' | '*' ; digit = "[0-9]" ; }"#;

    assert_eq!(pattern(source, "op"), r"(?:\+|\*)[0-9]");
}

#[test]
fn quantifier_bounds() {
    let source = r#"grammar G { leaf hex = "[0-9a-f]"{2,4} ; leaf word = "[a-z]"+ ; }"#;

    assert_eq!(pattern(source, "hex"), "([0-9a-f]){2,4}");
    assert_eq!(pattern(source, "word"), "([a-z]){1,}");
}

#[test]
fn cycle_is_reported_and_skipped() {
    let source = "grammar G { leaf a = 'x' a ; }";
    let (graph, leaves, diagnostics) = compress(source);

    let messages: Vec<_> = diagnostics.iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["error at 17..18: leaf rule `a` refers to itself"]);
    assert!(leaves.get(graph.find("a").unwrap()).is_none());
}

#[test]
fn invalid_pattern_is_reported() {
    let source = r#"grammar G { leaf bad = "[a-" ; }"#;
    let (_, leaves, diagnostics) = compress(source);

    assert!(leaves.is_empty());
    let message = diagnostics.iter().next().unwrap().to_string();
    assert!(
        message.starts_with("error at 17..20: leaf rule compresses to an invalid pattern: `[a-`"),
        "{message}"
    );
}

#[test]
fn empty_item_is_fatal() {
    let graph = graph("grammar G { leaf e = <empty> ; }");

    let err = compress_leaves(&graph).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedLeafItem { ref rule, item: "empty" } if rule == "e"
    ));
}
